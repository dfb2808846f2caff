//! Module argument protocol
//!
//! Automation hosts hand a module its arguments as a JSON mapping, either
//! flat or wrapped as `{"ANSIBLE_MODULE_ARGS": {...}}`. Keys starting with
//! `_ansible_` carry host settings (check mode, diff mode) and are stripped
//! before the remaining keys are validated against the module's schema.
//! Any other unknown key is rejected.

use anyhow::{Context, Result, bail};
use converge::{DesiredFileState, FileMode, Presence, parse_mode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::paths;

const WRAPPER_KEY: &str = "ANSIBLE_MODULE_ARGS";
const INTERNAL_PREFIX: &str = "_ansible_";

/// Parsed module arguments plus host settings
#[derive(Debug)]
pub struct Invocation<T> {
    pub params: T,
    pub check_mode: bool,
    pub diff: bool,
}

/// Read an args file, or stdin when `path` is `-`
pub fn read_args_file(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read module arguments from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Could not read arguments file {}", path.display()))
}

/// Parse raw JSON arguments against a module schema
pub fn parse_invocation<T: DeserializeOwned>(raw: &str) -> Result<Invocation<T>> {
    let value: Value = serde_json::from_str(raw).context("Module arguments are not valid JSON")?;

    let mut args = match value {
        Value::Object(mut map) => match map.remove(WRAPPER_KEY) {
            Some(Value::Object(inner)) => inner,
            Some(_) => bail!("{WRAPPER_KEY} must be a mapping"),
            None => map,
        },
        _ => bail!("Module arguments must be a JSON mapping"),
    };

    let check_mode = take_flag(&mut args, "_ansible_check_mode")?;
    let diff = take_flag(&mut args, "_ansible_diff")?;
    args.retain(|key, _| !key.starts_with(INTERNAL_PREFIX));

    let params = serde_json::from_value(Value::Object(args))
        .map_err(|e| anyhow::anyhow!("Unsupported or invalid parameters: {e}"))?;

    Ok(Invocation {
        params,
        check_mode,
        diff,
    })
}

fn take_flag(args: &mut Map<String, Value>, key: &str) -> Result<bool> {
    match args.remove(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(other) => bail!("{key} must be a boolean, got {other}"),
    }
}

// ============================================================================
// File module
// ============================================================================

/// Mode as given by the host: an octal string, or bits already decoded
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModeParam {
    Octal(String),
    Bits(u32),
}

impl ModeParam {
    /// `None` for an empty string, which leaves the mode unmanaged
    fn to_mode(&self) -> converge::Result<Option<FileMode>> {
        match self {
            Self::Octal(s) if s.trim().is_empty() => Ok(None),
            Self::Octal(s) => parse_mode(s).map(Some),
            Self::Bits(bits) => FileMode::from_bits(*bits).map(Some),
        }
    }
}

/// Arguments of the `file` module
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileParams {
    #[serde(default)]
    pub state: Presence,
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mode: Option<ModeParam>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl FileParams {
    /// Validate and convert into the reconciler's desired state
    pub fn into_desired(self) -> Result<DesiredFileState> {
        let path = expanded_path(&self.path)?;

        let mode = match &self.mode {
            Some(mode) => mode.to_mode()?,
            None => None,
        };

        Ok(DesiredFileState {
            path,
            presence: self.state,
            content: self.content.into_bytes(),
            mode,
            owner: non_empty(self.owner),
            group: non_empty(self.group),
        })
    }
}

fn expanded_path(raw: &str) -> Result<PathBuf> {
    if raw.trim().is_empty() {
        bail!("path is required");
    }
    let path = paths::expand(raw);
    if !path.is_absolute() {
        bail!("path must be absolute: {}", path.display());
    }
    Ok(path)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// Auth test module
// ============================================================================

/// Arguments of the `auth-test` module
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthTestParams {
    pub service_account_key: Value,
    pub folder_id: String,
    #[serde(default = "default_true")]
    pub validate_only: bool,
}

fn default_true() -> bool {
    true
}

impl From<AuthTestParams> for credcheck::AuthCheckRequest {
    fn from(params: AuthTestParams) -> Self {
        Self {
            service_account_key: params.service_account_key,
            folder_id: params.folder_id,
            validate_only: params.validate_only,
        }
    }
}
