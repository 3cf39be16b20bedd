//! Guarded stage execution.
//!
//! Every handler runs behind the same guard sequence:
//!
//! 1. target field already populated → [`EnrichError::AlreadyEnriched`]
//! 2. input field absent → skipped
//! 3. input field blank → skipped
//! 4. otherwise call the handler and write its result to the target field
//!
//! The existing-target check comes first, so a stage misconfigured to collide
//! with another stage's output fails even on documents it would skip.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::models::Document;

use super::types::{EnrichError, SkipReason, StageOutcome};

/// A stage-specific handler: input text in, target value out.
#[async_trait]
pub(crate) trait Enricher: Send + Sync {
    /// Stage type name used in errors and logs.
    fn stage_type(&self) -> &'static str;

    async fn enrich(&self, text: &str) -> Result<Value, EnrichError>;
}

/// One configured enrichment step.
pub struct Stage {
    input_field: String,
    target_field: String,
    handler: Box<dyn Enricher>,
}

impl Stage {
    pub(crate) fn new(
        input_field: impl Into<String>,
        target_field: impl Into<String>,
        handler: Box<dyn Enricher>,
    ) -> Self {
        Self {
            input_field: input_field.into(),
            target_field: target_field.into(),
            handler,
        }
    }

    pub fn stage_type(&self) -> &'static str {
        self.handler.stage_type()
    }

    pub fn input_field(&self) -> &str {
        &self.input_field
    }

    pub fn target_field(&self) -> &str {
        &self.target_field
    }

    /// Run the stage against a document.
    ///
    /// On any error the document is left as it was.
    pub async fn execute(&self, doc: &mut Document) -> Result<StageOutcome, EnrichError> {
        let stage = self.stage_type();

        if doc.has_field(&self.target_field) {
            return Err(EnrichError::AlreadyEnriched {
                stage,
                field: self.target_field.clone(),
            });
        }

        let text = match doc.get(&self.input_field) {
            None | Some(Value::Null) => {
                debug!(stage, field = %self.input_field, "input missing, skipping");
                return Ok(StageOutcome::Skipped(SkipReason::MissingInput));
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                debug!(stage, field = %self.input_field, "input empty, skipping");
                return Ok(StageOutcome::Skipped(SkipReason::EmptyInput));
            }
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(EnrichError::InputNotText {
                    stage,
                    field: self.input_field.clone(),
                    found: value_kind(other),
                })
            }
        };

        let value = self.handler.enrich(&text).await?;
        doc.set_field(&self.target_field, value)
            .map_err(|source| EnrichError::Document { stage, source })?;

        debug!(stage, field = %self.target_field, "enriched");
        Ok(StageOutcome::Enriched)
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("type", &self.stage_type())
            .field("input_field", &self.input_field)
            .field("target_field", &self.target_field)
            .finish()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Handler returning a fixed value and counting calls.
    pub(crate) struct FixedEnricher {
        pub name: &'static str,
        pub value: Value,
        pub calls: Arc<AtomicUsize>,
    }

    impl FixedEnricher {
        pub(crate) fn boxed(name: &'static str, value: Value) -> (Box<dyn Enricher>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let handler = Self {
                name,
                value,
                calls: calls.clone(),
            };
            (Box::new(handler), calls)
        }
    }

    #[async_trait]
    impl Enricher for FixedEnricher {
        fn stage_type(&self) -> &'static str {
            self.name
        }

        async fn enrich(&self, _text: &str) -> Result<Value, EnrichError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.clone())
        }
    }

    /// Handler that always fails with a shape error.
    pub(crate) struct FailingEnricher;

    #[async_trait]
    impl Enricher for FailingEnricher {
        fn stage_type(&self) -> &'static str {
            "categories"
        }

        async fn enrich(&self, _text: &str) -> Result<Value, EnrichError> {
            Err(EnrichError::shape("categories", "failed to categorize document"))
        }
    }

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_writes_target_field() {
        let (handler, calls) = FixedEnricher::boxed("language", json!("eng"));
        let stage = Stage::new("text", "language", handler);
        let mut d = doc(json!({"text": "This is a very English document."}));

        let outcome = stage.execute(&mut d).await.unwrap();

        assert_eq!(outcome, StageOutcome::Enriched);
        assert_eq!(d.get("language"), Some(&json!("eng")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_existing_target_is_guard_violation() {
        let (handler, calls) = FixedEnricher::boxed("categories", json!("ARTS"));
        let stage = Stage::new("text", "category", handler);
        let original = json!({"text": "some text", "category": "SPORTS"});
        let mut d = doc(original.clone());

        let err = stage.execute(&mut d).await.unwrap_err();

        assert!(matches!(
            err,
            EnrichError::AlreadyEnriched { stage: "categories", ref field } if field == "category"
        ));
        assert_eq!(d.into_value(), original);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_guard_precedes_missing_input() {
        let (handler, _) = FixedEnricher::boxed("sentiment", json!("pos"));
        let stage = Stage::new("body", "sentiment", handler);
        let mut d = doc(json!({"sentiment": "neg"}));

        let err = stage.execute(&mut d).await.unwrap_err();
        assert!(matches!(err, EnrichError::AlreadyEnriched { .. }));
    }

    #[tokio::test]
    async fn test_null_target_is_not_populated() {
        let (handler, _) = FixedEnricher::boxed("language", json!("eng"));
        let stage = Stage::new("text", "language", handler);
        let mut d = doc(json!({"text": "hello there", "language": null}));

        assert_eq!(stage.execute(&mut d).await.unwrap(), StageOutcome::Enriched);
        assert_eq!(d.get("language"), Some(&json!("eng")));
    }

    #[tokio::test]
    async fn test_skips_leave_document_unchanged() {
        for input in [
            json!({"other": 1}),
            json!({"text": null}),
            json!({"text": ""}),
            json!({"text": "  \n\t"}),
        ] {
            let (handler, calls) = FixedEnricher::boxed("language", json!("eng"));
            let stage = Stage::new("text", "language", handler);
            let mut d = doc(input.clone());

            let outcome = stage.execute(&mut d).await.unwrap();

            assert!(matches!(outcome, StageOutcome::Skipped(_)));
            assert_eq!(d.into_value(), input);
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_skip_reasons() {
        let (handler, _) = FixedEnricher::boxed("language", json!("eng"));
        let stage = Stage::new("text", "language", handler);

        let mut missing = Document::new();
        assert_eq!(
            stage.execute(&mut missing).await.unwrap(),
            StageOutcome::Skipped(SkipReason::MissingInput)
        );

        let mut empty = doc(json!({"text": ""}));
        assert_eq!(
            stage.execute(&mut empty).await.unwrap(),
            StageOutcome::Skipped(SkipReason::EmptyInput)
        );
    }

    #[tokio::test]
    async fn test_non_text_input_is_error() {
        let (handler, _) = FixedEnricher::boxed("language", json!("eng"));
        let stage = Stage::new("text", "language", handler);
        let mut d = doc(json!({"text": 42}));

        let err = stage.execute(&mut d).await.unwrap_err();
        assert!(matches!(
            err,
            EnrichError::InputNotText { found: "a number", .. }
        ));
    }

    #[tokio::test]
    async fn test_handler_failure_propagates_unchanged() {
        let stage = Stage::new("text", "category", Box::new(FailingEnricher));
        let mut d = doc(json!({"text": "abc"}));

        let err = stage.execute(&mut d).await.unwrap_err();
        assert_eq!(err.to_string(), "categories: failed to categorize document");
        assert!(!d.has_field("category"));
    }

    #[tokio::test]
    async fn test_nested_fields() {
        let (handler, _) = FixedEnricher::boxed("language", json!("spa"));
        let stage = Stage::new("body.text", "enrich.language", handler);
        let mut d = doc(json!({"body": {"text": "hola mundo"}}));

        stage.execute(&mut d).await.unwrap();
        assert_eq!(d.get("enrich.language"), Some(&json!("spa")));
    }
}
