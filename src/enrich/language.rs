//! Language identification stage.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiClient, LanguageResponse, Operation};

use super::codes::normalize_language_code;
use super::stage::Enricher;
use super::types::EnrichError;

pub(crate) const STAGE_TYPE: &str = "language";

pub(crate) struct LanguageEnricher {
    client: Arc<ApiClient>,
}

impl LanguageEnricher {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Enricher for LanguageEnricher {
    fn stage_type(&self) -> &'static str {
        STAGE_TYPE
    }

    async fn enrich(&self, text: &str) -> Result<Value, EnrichError> {
        let response: LanguageResponse = self
            .client
            .send_document_operation(Operation::Language, text, None)
            .await
            .map_err(|source| EnrichError::Api {
                stage: STAGE_TYPE,
                source,
            })?;

        detected_language(&response).map(Value::String)
    }
}

/// Top detection, normalized to ISO 639-3 where the code is known.
///
/// Alphabetic codes the table cannot map are kept as-is, lowercased.
fn detected_language(response: &LanguageResponse) -> Result<String, EnrichError> {
    let code = response
        .top_language()
        .ok_or_else(|| EnrichError::shape(STAGE_TYPE, "failed to detect language of document"))?;

    if let Some(normalized) = normalize_language_code(code) {
        return Ok(normalized);
    }
    let code = code.trim();
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(code.to_ascii_lowercase());
    }
    Err(EnrichError::shape(
        STAGE_TYPE,
        format!("service returned unrecognized language code `{}`", code),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> LanguageResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_takes_first_detection() {
        let resp = response(
            r#"{"languageDetections":[{"language":"ENG","confidence":0.8},{"language":"deu","confidence":0.1}]}"#,
        );
        assert_eq!(detected_language(&resp).unwrap(), "eng");
    }

    #[test]
    fn test_empty_detections_is_shape_error() {
        let err = detected_language(&response(r#"{"languageDetections":[]}"#)).unwrap_err();
        assert!(matches!(err, EnrichError::ResponseShape { stage: "language", .. }));
    }

    #[test]
    fn test_short_code_mapped_when_known() {
        let resp = response(r#"{"languageDetections":[{"language":"de"}]}"#);
        assert_eq!(detected_language(&resp).unwrap(), "deu");
    }

    #[test]
    fn test_unmapped_alphabetic_code_passes_through() {
        let resp = response(r#"{"languageDetections":[{"language":"GA"}]}"#);
        assert_eq!(detected_language(&resp).unwrap(), "ga");

        let resp = response(r#"{"languageDetections":[{"language":"zxx-x"}]}"#);
        assert!(detected_language(&resp).is_err());
    }

    #[test]
    fn test_garbage_code_is_shape_error() {
        let err = detected_language(&response(r#"{"languageDetections":[{"language":"??"}]}"#))
            .unwrap_err();
        assert!(err.to_string().contains("unrecognized language code"));
    }
}
