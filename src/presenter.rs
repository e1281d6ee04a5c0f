//! Terminal output and the append-only run log

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::brief::TravelBrief;
use crate::config::PresenterConfig;
use crate::error::GuardrailStage;
use crate::TripBriefError;

/// How a run ended, as written to the run log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Delivered { bytes: usize },
    InputRejected,
    OutputRejected,
    Failed(String),
}

impl RunOutcome {
    #[must_use]
    pub fn from_error(error: &TripBriefError) -> Self {
        match error {
            TripBriefError::Guardrail {
                stage: GuardrailStage::Input,
                ..
            }
            | TripBriefError::Validation { .. } => RunOutcome::InputRejected,
            TripBriefError::Guardrail {
                stage: GuardrailStage::Output,
                ..
            } => RunOutcome::OutputRejected,
            other => RunOutcome::Failed(other.to_string()),
        }
    }

    fn level(&self) -> &'static str {
        match self {
            RunOutcome::Delivered { .. } => "INFO",
            RunOutcome::InputRejected | RunOutcome::OutputRejected => "WARN",
            RunOutcome::Failed(_) => "ERROR",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Delivered { bytes } => write!(f, "outcome=delivered bytes={bytes}"),
            RunOutcome::InputRejected => f.write_str("outcome=input_rejected"),
            RunOutcome::OutputRejected => f.write_str("outcome=output_rejected"),
            RunOutcome::Failed(reason) => {
                write!(f, "outcome=failed reason=\"{}\"", one_line(reason))
            }
        }
    }
}

pub struct Presenter {
    log_path: PathBuf,
}

impl Presenter {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(log_path: P) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &PresenterConfig) -> Self {
        Self::new(&config.log_path)
    }

    /// Write the brief to `out`
    pub fn present<W: Write>(&self, out: &mut W, brief: &TravelBrief) -> crate::Result<()> {
        let markdown = brief.markdown();
        out.write_all(markdown.as_bytes())?;
        if !markdown.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Append one line for this run. Failures are logged and swallowed.
    pub fn record(&self, city: &str, outcome: &RunOutcome) {
        let line = format!(
            "{} [{}] city=\"{}\" {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            outcome.level(),
            one_line(city),
            outcome
        );

        match self.append(&line) {
            Ok(()) => debug!("Recorded run in {}", self.log_path.display()),
            Err(e) => warn!("Failed to write run log {}: {e}", self.log_path.display()),
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(line.as_bytes())
    }
}

fn one_line(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('"', "'")
}
