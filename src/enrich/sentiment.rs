//! Document sentiment stage.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiClient, Operation, SentimentResponse};

use super::stage::Enricher;
use super::types::EnrichError;

pub(crate) const STAGE_TYPE: &str = "sentiment";

pub(crate) struct SentimentEnricher {
    client: Arc<ApiClient>,
}

impl SentimentEnricher {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Enricher for SentimentEnricher {
    fn stage_type(&self) -> &'static str {
        STAGE_TYPE
    }

    async fn enrich(&self, text: &str) -> Result<Value, EnrichError> {
        let response: SentimentResponse = self
            .client
            .send_document_operation(Operation::Sentiment, text, None)
            .await
            .map_err(|source| EnrichError::Api {
                stage: STAGE_TYPE,
                source,
            })?;

        response
            .document_label()
            .map(|label| Value::String(label.to_string()))
            .ok_or_else(|| {
                EnrichError::shape(STAGE_TYPE, "failed to determine sentiment of document")
            })
    }
}
