use std::fmt;

use crate::config::Anchors;
use crate::error::Result;
use crate::policy::{FunctionIdentity, Policy};

pub mod auth;
pub mod error_boundary;
pub mod headers_const;
pub mod imports;
pub mod origin;
pub mod preflight;
pub mod response_headers;

pub use auth::AuthInjection;
pub use error_boundary::ErrorBoundary;
pub use headers_const::HeadersConstRemoval;
pub use imports::ImportNormalization;
pub use origin::OriginNormalization;
pub use preflight::PreflightCanonicalization;
pub use response_headers::ResponseHeaders;

/// Context passed to every codemod for one handler file.
#[derive(Debug, Clone, Copy)]
pub struct CodemodContext<'a> {
    pub identity: &'a FunctionIdentity,
    pub policy: Policy,
    pub anchors: &'a Anchors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Skipped,
    Warning,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Applied => "applied",
            Outcome::Skipped => "skipped",
            Outcome::Warning => "warning",
        };
        f.write_str(s)
    }
}

/// What one codemod did to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    /// New content, or `None` if the step left the text alone.
    pub content: Option<String>,
    pub notes: Vec<(Outcome, String)>,
}

impl StepOutput {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn changed(content: String) -> Self {
        Self {
            content: Some(content),
            notes: Vec::new(),
        }
    }

    pub fn applied(self, message: impl Into<String>) -> Self {
        self.note(Outcome::Applied, message)
    }

    pub fn skipped(self, message: impl Into<String>) -> Self {
        self.note(Outcome::Skipped, message)
    }

    pub fn warning(self, message: impl Into<String>) -> Self {
        self.note(Outcome::Warning, message)
    }

    fn note(mut self, outcome: Outcome, message: impl Into<String>) -> Self {
        self.notes.push((outcome, message.into()));
        self
    }
}

/// One idempotent source transformation. Running a codemod on its own output
/// must leave the text unchanged.
pub trait Codemod {
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput>;
}
