//! Document categorization stage.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiClient, CategoriesResponse, Operation};

use super::stage::Enricher;
use super::types::EnrichError;

pub(crate) const STAGE_TYPE: &str = "categories";

pub(crate) struct CategoriesEnricher {
    client: Arc<ApiClient>,
}

impl CategoriesEnricher {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Enricher for CategoriesEnricher {
    fn stage_type(&self) -> &'static str {
        STAGE_TYPE
    }

    async fn enrich(&self, text: &str) -> Result<Value, EnrichError> {
        let response: CategoriesResponse = self
            .client
            .send_document_operation(Operation::Categories, text, None)
            .await
            .map_err(|source| EnrichError::Api {
                stage: STAGE_TYPE,
                source,
            })?;

        response
            .top_label()
            .map(|label| Value::String(label.to_string()))
            .ok_or_else(|| EnrichError::shape(STAGE_TYPE, "failed to categorize document"))
    }
}
