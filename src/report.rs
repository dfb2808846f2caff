//! Success and failure reports
//!
//! JSON is the host protocol: one object on stdout per invocation. Text
//! output is for people running the modules by hand.

use anyhow::Result;
use converge::{Presence, ReconciliationResult};
use credcheck::AuthCheckReport;
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::ui;

/// Something that can be written as a module report
pub trait Report: Serialize {
    fn render_text(&self);
}

/// Write a report in the requested format
pub fn emit<R: Report>(format: OutputFormat, report: &R) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::Text => report.render_text(),
    }
    Ok(())
}

/// Result of the `file` module
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub state: Presence,
    #[serde(flatten)]
    pub result: ReconciliationResult,
}

impl FileReport {
    pub fn new(path: &Path, state: Presence, result: ReconciliationResult) -> Self {
        Self {
            path: path.display().to_string(),
            state,
            result,
        }
    }
}

impl Report for FileReport {
    fn render_text(&self) {
        let verb = match (self.state, self.result.changed) {
            (Presence::Present, true) => "updated",
            (Presence::Absent, true) => "removed",
            (Presence::Present, false) => "up to date",
            (Presence::Absent, false) => "already absent",
        };
        let line = format!("{} {verb}", self.path);
        if self.result.changed {
            ui::changed(&line);
        } else {
            ui::ok(&line);
        }

        if let Some(size) = self.result.size {
            ui::kv("size", &ui::format_size(size));
        }
        if let Some(checksum) = &self.result.checksum {
            ui::kv("checksum", checksum);
        }
        if let Some(diff) = &self.result.diff {
            ui::diff(&diff.before_header, &diff.after_header, &diff.before, &diff.after);
        }
    }
}

/// Result of the `auth-test` module
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct AuthReport(pub AuthCheckReport);

impl Report for AuthReport {
    fn render_text(&self) {
        let report = &self.0;
        if report.authenticated {
            ui::ok(&report.message);
        } else {
            ui::failed(&report.message);
        }
        ui::kv("folder_id", &report.folder_id);
        ui::kv("validation_passed", &report.validation_passed.to_string());
        if let Some(id) = &report.service_account_id {
            ui::kv("service_account_id", id);
        }
    }
}

/// Terminal failure of a module invocation
#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub failed: bool,
    pub msg: String,
    /// Full error chain, for operator debugging
    pub exception: String,
}

impl FailureReport {
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            failed: true,
            msg: format!("{err:#}"),
            exception: format!("{err:?}"),
        }
    }
}

impl Report for FailureReport {
    fn render_text(&self) {
        ui::failed(&self.msg);
        if log::log_enabled!(log::Level::Debug) {
            for line in self.exception.lines() {
                ui::dim(line);
            }
        }
    }
}
