//! Types shared across enrichment stages.

use thiserror::Error;

use crate::api::ApiError;
use crate::models::DocumentError;

/// Why a stage left a document untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Input field absent (or `null`).
    MissingInput,
    /// Input field is an empty or whitespace-only string.
    EmptyInput,
}

/// Result of one successful stage execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The target field was written.
    Enriched,
    /// The stage was a no-op.
    Skipped(SkipReason),
}

/// Outcome of one stage within a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: &'static str,
    pub target_field: String,
    pub outcome: StageOutcome,
}

/// Errors that abort a stage invocation.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("{stage}: field `{field}` is already populated")]
    AlreadyEnriched { stage: &'static str, field: String },

    #[error("{stage}: input field `{field}` must be text, found {found}")]
    InputNotText {
        stage: &'static str,
        field: String,
        found: &'static str,
    },

    #[error("{stage}: {message}")]
    ResponseShape { stage: &'static str, message: String },

    #[error("{stage}: {source}")]
    Api {
        stage: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("{stage}: {source}")]
    Document {
        stage: &'static str,
        #[source]
        source: DocumentError,
    },
}

impl EnrichError {
    pub(crate) fn shape(stage: &'static str, message: impl Into<String>) -> Self {
        EnrichError::ResponseShape {
            stage,
            message: message.into(),
        }
    }

    /// Stage type that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            EnrichError::AlreadyEnriched { stage, .. }
            | EnrichError::InputNotText { stage, .. }
            | EnrichError::ResponseShape { stage, .. }
            | EnrichError::Api { stage, .. }
            | EnrichError::Document { stage, .. } => stage,
        }
    }
}

/// Errors in stage or pipeline configuration, detected before any document runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{stage}: `{option}` is not a valid language code: `{value}`")]
    InvalidLanguage {
        stage: &'static str,
        option: &'static str,
        value: String,
    },

    #[error("{stage}: `{option}` is not a valid script code: `{value}`")]
    InvalidScript {
        stage: &'static str,
        option: &'static str,
        value: String,
    },

    #[error("{stage}: `{option}` must not be empty")]
    EmptyField {
        stage: &'static str,
        option: &'static str,
    },

    #[error("stages `{first}` and `{second}` both write `{field}`")]
    DuplicateTarget {
        field: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("stage `{second}` writes `{nested}` inside `{outer}`, which stage `{first}` writes")]
    OverlappingTarget {
        outer: String,
        nested: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("no stages configured")]
    NoStages,
}
