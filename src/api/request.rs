//! Request bodies and operation identifiers.

use std::fmt;

use serde::Serialize;

/// Language code meaning "not specified"; never sent on the wire.
pub const UNSPECIFIED_LANGUAGE: &str = "xxx";

/// Script code meaning "not specified"; never sent on the wire.
pub const UNSPECIFIED_SCRIPT: &str = "Zyyy";

/// Remote operations exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Language,
    Categories,
    Sentiment,
    Entities,
    NameTranslation,
    Ping,
}

impl Operation {
    /// Path relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Operation::Language => "language",
            Operation::Categories => "categories",
            Operation::Sentiment => "sentiment",
            Operation::Entities => "entities",
            Operation::NameTranslation => "name-translation",
            Operation::Ping => "ping",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Body for document-level operations (language, categories, sentiment, entities).
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRequest<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
}

/// Body for the name translation operation.
///
/// Builder methods drop the unspecified sentinels (`xxx`, `Zyyy`) so only
/// meaningful hints reach the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameTranslationRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language_of_use: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language_of_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_script: Option<String>,
}

impl NameTranslationRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn target_language(mut self, code: &str) -> Self {
        self.target_language = specified_language(code);
        self
    }

    pub fn target_script(mut self, code: &str) -> Self {
        self.target_script = specified_script(code);
        self
    }

    pub fn entity_type(mut self, entity_type: &str) -> Self {
        let trimmed = entity_type.trim();
        self.entity_type = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn source_language_of_use(mut self, code: &str) -> Self {
        self.source_language_of_use = specified_language(code);
        self
    }

    pub fn source_language_of_origin(mut self, code: &str) -> Self {
        self.source_language_of_origin = specified_language(code);
        self
    }

    pub fn source_script(mut self, code: &str) -> Self {
        self.source_script = specified_script(code);
        self
    }
}

fn specified_language(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() || code.eq_ignore_ascii_case(UNSPECIFIED_LANGUAGE) {
        None
    } else {
        Some(code.to_string())
    }
}

fn specified_script(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() || code.eq_ignore_ascii_case(UNSPECIFIED_SCRIPT) {
        None
    } else {
        Some(code.to_string())
    }
}
