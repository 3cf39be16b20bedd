//! Name translation stage: the input field holds a single name.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiClient, NameTranslationRequest, NameTranslationResponse};

use super::stage::Enricher;
use super::types::EnrichError;

pub(crate) const STAGE_TYPE: &str = "name_translation";

/// Validated translation hints. Codes are already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NameTranslationOptions {
    pub target_language: String,
    pub target_script: String,
    pub entity_type: String,
    pub source_language: String,
    pub source_script: String,
    pub source_language_of_origin: String,
}

impl NameTranslationOptions {
    fn request(&self, name: &str) -> NameTranslationRequest {
        NameTranslationRequest::new(name)
            .target_language(&self.target_language)
            .target_script(&self.target_script)
            .entity_type(&self.entity_type)
            .source_language_of_use(&self.source_language)
            .source_language_of_origin(&self.source_language_of_origin)
            .source_script(&self.source_script)
    }
}

pub(crate) struct NameTranslationEnricher {
    client: Arc<ApiClient>,
    options: NameTranslationOptions,
}

impl NameTranslationEnricher {
    pub(crate) fn new(client: Arc<ApiClient>, options: NameTranslationOptions) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl Enricher for NameTranslationEnricher {
    fn stage_type(&self) -> &'static str {
        STAGE_TYPE
    }

    async fn enrich(&self, text: &str) -> Result<Value, EnrichError> {
        let request = self.options.request(text.trim());
        let translation = translate(&self.client, &request, STAGE_TYPE).await?;
        Ok(Value::String(translation))
    }
}

/// Issue one name translation call and extract the translated string.
///
/// Shared with the entities stage, which reports failures under its own
/// stage type.
pub(crate) async fn translate(
    client: &ApiClient,
    request: &NameTranslationRequest,
    stage: &'static str,
) -> Result<String, EnrichError> {
    let response: NameTranslationResponse = client
        .send_name_translation(request)
        .await
        .map_err(|source| EnrichError::Api { stage, source })?;

    response
        .translation
        .filter(|t| !t.is_empty())
        .ok_or_else(|| EnrichError::shape(stage, format!("failed to translate `{}`", request.name)))
}
