//! Enrichment stages and the pipeline that runs them.
//!
//! Each stage reads text from an input field, calls the text analytics
//! service through a shared [`ApiClient`](crate::api::ApiClient), and writes
//! one value to a target field. All stages run behind the guard in
//! [`Stage::execute`].

mod categories;
mod codes;
mod config;
mod entities;
mod language;
mod name_translation;
mod pipeline;
mod sentiment;
mod stage;
mod types;

pub use codes::{normalize_language_code, normalize_script_code};
pub use config::{
    EntitiesStageConfig, NameTranslationStageConfig, SimpleStageConfig, StageConfig,
    DEFAULT_INPUT_FIELD,
};
pub use pipeline::Pipeline;
pub use stage::Stage;
pub use types::{ConfigError, EnrichError, SkipReason, StageOutcome, StageReport};
