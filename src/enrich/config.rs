//! Stage configuration.
//!
//! Stages are declared in the config file as a list of tables tagged by
//! `type`:
//!
//! ```toml
//! [[stages]]
//! type = "entities"
//! field = "body"
//! include_offsets = true
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;

use super::categories::{self, CategoriesEnricher};
use super::codes::{normalize_language_code, normalize_script_code};
use super::entities::{self, EntitiesEnricher, EntitiesOptions};
use super::language::{self, LanguageEnricher};
use super::name_translation::{self, NameTranslationEnricher, NameTranslationOptions};
use super::sentiment::{self, SentimentEnricher};
use super::stage::Stage;
use super::types::ConfigError;

pub const DEFAULT_INPUT_FIELD: &str = "text";

/// One configured stage. Immutable once the pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageConfig {
    Language(SimpleStageConfig),
    Categories(SimpleStageConfig),
    Sentiment(SimpleStageConfig),
    Entities(EntitiesStageConfig),
    NameTranslation(NameTranslationStageConfig),
}

/// Options shared by the single-call stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleStageConfig {
    /// Input field holding the text
    #[serde(default = "default_input_field")]
    pub field: String,
    /// Field the result is written to (stage-specific default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitiesStageConfig {
    #[serde(default = "default_input_field")]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    /// Emit mention offsets per entity
    #[serde(default)]
    pub include_offsets: bool,
    /// Translate PERSON, LOCATION and ORGANIZATION mentions
    #[serde(default)]
    pub include_translation: bool,
    /// Target language for translations
    #[serde(default = "default_target_language")]
    pub translation_language: String,
    /// Emit per-entity sentiment
    #[serde(default)]
    pub include_sentiment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameTranslationStageConfig {
    #[serde(default = "default_input_field")]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_script")]
    pub target_script: String,
    #[serde(default = "default_entity_type")]
    pub entity_type: String,
    /// Language of use of the name (`xxx` = unspecified)
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_script")]
    pub source_script: String,
    #[serde(default = "default_source_language")]
    pub source_language_of_origin: String,
}

fn default_input_field() -> String {
    DEFAULT_INPUT_FIELD.to_string()
}

fn default_target_language() -> String {
    "eng".to_string()
}

fn default_source_language() -> String {
    crate::api::UNSPECIFIED_LANGUAGE.to_string()
}

fn default_script() -> String {
    crate::api::UNSPECIFIED_SCRIPT.to_string()
}

fn default_entity_type() -> String {
    "PERSON".to_string()
}

impl Default for SimpleStageConfig {
    fn default() -> Self {
        Self {
            field: default_input_field(),
            target_field: None,
        }
    }
}

impl Default for EntitiesStageConfig {
    fn default() -> Self {
        Self {
            field: default_input_field(),
            target_field: None,
            include_offsets: false,
            include_translation: false,
            translation_language: default_target_language(),
            include_sentiment: false,
        }
    }
}

impl Default for NameTranslationStageConfig {
    fn default() -> Self {
        Self {
            field: default_input_field(),
            target_field: None,
            target_language: default_target_language(),
            target_script: default_script(),
            entity_type: default_entity_type(),
            source_language: default_source_language(),
            source_script: default_script(),
            source_language_of_origin: default_source_language(),
        }
    }
}

impl StageConfig {
    pub fn stage_type(&self) -> &'static str {
        match self {
            StageConfig::Language(_) => language::STAGE_TYPE,
            StageConfig::Categories(_) => categories::STAGE_TYPE,
            StageConfig::Sentiment(_) => sentiment::STAGE_TYPE,
            StageConfig::Entities(_) => entities::STAGE_TYPE,
            StageConfig::NameTranslation(_) => name_translation::STAGE_TYPE,
        }
    }

    pub fn input_field(&self) -> &str {
        match self {
            StageConfig::Language(c) | StageConfig::Categories(c) | StageConfig::Sentiment(c) => {
                &c.field
            }
            StageConfig::Entities(c) => &c.field,
            StageConfig::NameTranslation(c) => &c.field,
        }
    }

    /// Configured target field, or the stage default.
    pub fn target_field(&self) -> &str {
        let configured = match self {
            StageConfig::Language(c) | StageConfig::Categories(c) | StageConfig::Sentiment(c) => {
                c.target_field.as_deref()
            }
            StageConfig::Entities(c) => c.target_field.as_deref(),
            StageConfig::NameTranslation(c) => c.target_field.as_deref(),
        };
        configured.unwrap_or_else(|| self.default_target_field())
    }

    fn default_target_field(&self) -> &'static str {
        match self {
            StageConfig::Language(_) => "ros_language",
            StageConfig::Categories(_) => "ros_category",
            StageConfig::Sentiment(_) => "ros_sentiment",
            StageConfig::Entities(_) => "ros_entities",
            StageConfig::NameTranslation(_) => "ros_translation",
        }
    }

    /// Validate options and build a runnable stage sharing `client`.
    pub fn build(&self, client: Arc<ApiClient>) -> Result<Stage, ConfigError> {
        let stage = self.stage_type();
        let input = non_empty_field(stage, "field", self.input_field())?;
        let target = non_empty_field(stage, "target_field", self.target_field())?;

        let handler: Box<dyn super::stage::Enricher> = match self {
            StageConfig::Language(_) => Box::new(LanguageEnricher::new(client)),
            StageConfig::Categories(_) => Box::new(CategoriesEnricher::new(client)),
            StageConfig::Sentiment(_) => Box::new(SentimentEnricher::new(client)),
            StageConfig::Entities(c) => Box::new(EntitiesEnricher::new(client, c.options()?)),
            StageConfig::NameTranslation(c) => {
                Box::new(NameTranslationEnricher::new(client, c.options()?))
            }
        };

        Ok(Stage::new(input, target, handler))
    }
}

impl EntitiesStageConfig {
    fn options(&self) -> Result<EntitiesOptions, ConfigError> {
        Ok(EntitiesOptions {
            include_offsets: self.include_offsets,
            include_translation: self.include_translation,
            translation_language: language_option(
                entities::STAGE_TYPE,
                "translation_language",
                &self.translation_language,
            )?,
            include_sentiment: self.include_sentiment,
        })
    }
}

impl NameTranslationStageConfig {
    fn options(&self) -> Result<NameTranslationOptions, ConfigError> {
        let stage = name_translation::STAGE_TYPE;
        Ok(NameTranslationOptions {
            target_language: language_option(stage, "target_language", &self.target_language)?,
            target_script: script_option(stage, "target_script", &self.target_script)?,
            entity_type: self.entity_type.trim().to_ascii_uppercase(),
            source_language: language_option(stage, "source_language", &self.source_language)?,
            source_script: script_option(stage, "source_script", &self.source_script)?,
            source_language_of_origin: language_option(
                stage,
                "source_language_of_origin",
                &self.source_language_of_origin,
            )?,
        })
    }
}

fn non_empty_field(
    stage: &'static str,
    option: &'static str,
    value: &str,
) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyField { stage, option });
    }
    Ok(trimmed.to_string())
}

fn language_option(
    stage: &'static str,
    option: &'static str,
    value: &str,
) -> Result<String, ConfigError> {
    normalize_language_code(value).ok_or_else(|| ConfigError::InvalidLanguage {
        stage,
        option,
        value: value.to_string(),
    })
}

fn script_option(
    stage: &'static str,
    option: &'static str,
    value: &str,
) -> Result<String, ConfigError> {
    normalize_script_code(value).ok_or_else(|| ConfigError::InvalidScript {
        stage,
        option,
        value: value.to_string(),
    })
}
