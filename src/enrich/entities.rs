//! Entity extraction stage with per-entity translation fan-out.
//!
//! One document-level call is made regardless of entity count: `/sentiment`
//! when entity sentiment is requested (its `entities` array carries a
//! per-entity label), `/entities` otherwise. Translation then costs one
//! extra round trip per PERSON, LOCATION or ORGANIZATION entity, issued
//! sequentially so the output keeps source order. Disable translation when
//! throughput matters.
//!
//! Any failed translation aborts the whole invocation; a partial entity list
//! is never written.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::api::{
    ApiClient, ApiEntity, ApiError, EntitiesResponse, NameTranslationRequest, Operation,
    SentimentResponse,
};
use crate::models::{is_translatable, EntityRecord, MentionSpan};

use super::name_translation::translate;
use super::stage::Enricher;
use super::types::EnrichError;

pub(crate) const STAGE_TYPE: &str = "entities";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntitiesOptions {
    pub include_offsets: bool,
    pub include_translation: bool,
    /// Normalized ISO 639-3 code.
    pub translation_language: String,
    pub include_sentiment: bool,
}

pub(crate) struct EntitiesEnricher {
    client: Arc<ApiClient>,
    options: EntitiesOptions,
}

impl EntitiesEnricher {
    pub(crate) fn new(client: Arc<ApiClient>, options: EntitiesOptions) -> Self {
        Self { client, options }
    }

    async fn extract(&self, text: &str) -> Result<Vec<ApiEntity>, EnrichError> {
        let api_err = |source: ApiError| EnrichError::Api {
            stage: STAGE_TYPE,
            source,
        };

        let entities = if self.options.include_sentiment {
            let response: SentimentResponse = self
                .client
                .send_document_operation(Operation::Sentiment, text, None)
                .await
                .map_err(api_err)?;
            response.entities
        } else {
            let response: EntitiesResponse = self
                .client
                .send_document_operation(Operation::Entities, text, None)
                .await
                .map_err(api_err)?;
            response.entities
        };

        Ok(entities.unwrap_or_default())
    }
}

#[async_trait]
impl Enricher for EntitiesEnricher {
    fn stage_type(&self) -> &'static str {
        STAGE_TYPE
    }

    async fn enrich(&self, text: &str) -> Result<Value, EnrichError> {
        let entities = self.extract(text).await?;
        debug!(count = entities.len(), "extracted entities");

        let mut records = Vec::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            let mut record = project(entity, &self.options).map_err(|message| {
                EnrichError::shape(STAGE_TYPE, format!("entity {}: {}", index, message))
            })?;

            if self.options.include_translation && is_translatable(&record.entity_type) {
                let request = NameTranslationRequest::new(record.mention.as_str())
                    .target_language(&self.options.translation_language)
                    .entity_type(&record.entity_type);

                // Returns early: no partial list reaches the document.
                record.translation = Some(translate(&self.client, &request, STAGE_TYPE).await?);
            }

            records.push(Value::from(record));
        }

        Ok(Value::Array(records))
    }
}

/// Project one service entity into a record, without translation.
///
/// Mention text and type are required; everything else is optional and
/// omitted when absent.
fn project(entity: &ApiEntity, options: &EntitiesOptions) -> Result<EntityRecord, String> {
    let mention = entity
        .head_mention()
        .ok_or("missing mention text")?
        .to_string();
    let entity_type = entity
        .entity_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or("missing entity type")?
        .to_string();

    let count = entity
        .count
        .unwrap_or(entity.mention_offsets.len() as u64);

    let offsets = options.include_offsets.then(|| {
        entity
            .mention_offsets
            .iter()
            .map(|o| MentionSpan {
                start: o.start_offset,
                end: o.end_offset,
            })
            .collect()
    });

    let sentiment = if options.include_sentiment {
        entity
            .sentiment
            .as_ref()
            .and_then(|s| s.label.as_deref())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    Ok(EntityRecord {
        mention,
        entity_type,
        entity_id: entity.entity_id.clone().filter(|id| !id.is_empty()),
        count,
        offsets,
        sentiment,
        translation: None,
    })
}
