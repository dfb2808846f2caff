//! # credcheck
//!
//! Offline shape validation for cloud service-account keys.
//!
//! Nothing here talks to a remote service. A check decodes the key blob and
//! looks at the folder identifier's prefix, then reports the outcome.
//! Malformed keys are a normal, reportable outcome and never an error for
//! the caller.
//!
//! ```
//! use credcheck::{AuthCheckRequest, check};
//! use serde_json::json;
//!
//! let report = check(&AuthCheckRequest::new(json!(r#"{"id": "test-id"}"#), "b1gtest123"));
//! assert!(report.validation_passed);
//! assert!(report.authenticated);
//! assert_eq!(report.service_account_id.as_deref(), Some("test-id"));
//! ```

pub mod decode;
mod error;

pub use decode::{decode_key, decode_str};
pub use error::{Error, Result};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Folder identifier prefixes the catalog issues
pub const FOLDER_PREFIXES: &[&str] = &["b1g", "cat", "aje"];

/// Input to a credential check
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthCheckRequest {
    pub service_account_key: Value,
    pub folder_id: String,
    #[serde(default = "default_validate_only")]
    pub validate_only: bool,
}

fn default_validate_only() -> bool {
    true
}

impl AuthCheckRequest {
    pub fn new(service_account_key: Value, folder_id: impl Into<String>) -> Self {
        Self {
            service_account_key,
            folder_id: folder_id.into(),
            validate_only: true,
        }
    }
}

/// Outcome of a credential check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCheckReport {
    /// Always false, a check never modifies anything
    pub changed: bool,
    pub authenticated: bool,
    pub folder_id: String,
    pub message: String,
    pub validation_passed: bool,
    pub service_account_id: Option<String>,
}

/// Whether a folder identifier carries a recognized prefix
pub fn is_known_folder_id(folder_id: &str) -> bool {
    FOLDER_PREFIXES.iter().any(|p| folder_id.starts_with(p))
}

/// Validate a key blob and folder identifier
pub fn check(request: &AuthCheckRequest) -> AuthCheckReport {
    if !request.validate_only {
        log::warn!("Remote verification is not supported; only the key format is checked");
    }

    let mut report = AuthCheckReport {
        changed: false,
        authenticated: false,
        folder_id: request.folder_id.clone(),
        message: String::new(),
        validation_passed: false,
        service_account_id: None,
    };

    let key = match decode_key(&request.service_account_key) {
        Ok(key) => key,
        Err(e) => {
            // The key itself is secret; log the reason only
            log::debug!("{e}");
            report.message = "Service account key is not valid JSON".to_string();
            return report;
        }
    };

    report.validation_passed = true;
    report.service_account_id = service_account_id(&key);

    if is_known_folder_id(&request.folder_id) {
        report.authenticated = true;
        report.message = format!("Validation passed for folder: {}", request.folder_id);
    } else {
        report.message = format!("Invalid folder ID format: {}", request.folder_id);
    }

    report
}

/// `service_account_id`, falling back to `id`, when the key is a mapping
fn service_account_id(key: &Value) -> Option<String> {
    let map = key.as_object()?;
    let id = map.get("service_account_id").or_else(|| map.get("id"))?;
    Some(match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
