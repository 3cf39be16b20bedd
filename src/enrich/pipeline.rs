//! Pipeline runner: sequences configured stages over documents.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::models::Document;

use super::config::StageConfig;
use super::stage::Stage;
use super::types::{ConfigError, EnrichError, StageReport};

/// An ordered list of stages with distinct target fields.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Build a pipeline, rejecting two stages that write the same field or
    /// one stage that writes inside another's target.
    pub fn new(stages: Vec<Stage>) -> Result<Self, ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::NoStages);
        }

        let mut owners: HashMap<&str, &'static str> = HashMap::new();
        for stage in &stages {
            let target = stage.target_field();
            if let Some(first) = owners.insert(target, stage.stage_type()) {
                return Err(ConfigError::DuplicateTarget {
                    field: target.to_string(),
                    first,
                    second: stage.stage_type(),
                });
            }
        }

        for (i, earlier) in stages.iter().enumerate() {
            for later in &stages[i + 1..] {
                let (a, b) = (earlier.target_field(), later.target_field());
                let (outer, nested) = if is_path_prefix(a, b) {
                    (a, b)
                } else if is_path_prefix(b, a) {
                    (b, a)
                } else {
                    continue;
                };
                return Err(ConfigError::OverlappingTarget {
                    outer: outer.to_string(),
                    nested: nested.to_string(),
                    first: earlier.stage_type(),
                    second: later.stage_type(),
                });
            }
        }

        Ok(Self { stages })
    }

    /// Build every configured stage against one shared client.
    pub fn from_config(configs: &[StageConfig], client: Arc<ApiClient>) -> Result<Self, ConfigError> {
        let stages = configs
            .iter()
            .map(|c| c.build(client.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stages)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order, stopping at the first failure.
    ///
    /// Stages that completed before the failure keep their output.
    pub async fn run(&self, doc: &mut Document) -> Result<Vec<StageReport>, EnrichError> {
        let mut reports = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let outcome = stage.execute(doc).await?;
            reports.push(StageReport {
                stage: stage.stage_type(),
                target_field: stage.target_field().to_string(),
                outcome,
            });
        }
        Ok(reports)
    }

    /// Process independent documents with at most `workers` in flight.
    ///
    /// Results come back in input order.
    pub async fn run_batch(
        &self,
        docs: Vec<Document>,
        workers: usize,
    ) -> Vec<Result<Document, EnrichError>> {
        self.run_batch_with(docs, workers, |_, _| {}).await
    }

    /// Like [`run_batch`](Self::run_batch), calling `on_done(index, result)`
    /// as each document finishes.
    pub async fn run_batch_with<F>(
        &self,
        docs: Vec<Document>,
        workers: usize,
        on_done: F,
    ) -> Vec<Result<Document, EnrichError>>
    where
        F: Fn(usize, &Result<Document, EnrichError>),
    {
        let workers = workers.max(1);
        debug!(documents = docs.len(), workers, "running batch");

        stream::iter(docs.into_iter().enumerate())
            .map(|(index, mut doc)| async move {
                let result = self.run(&mut doc).await.map(|_| doc);
                if let Err(e) = &result {
                    warn!("document {} failed: {}", index, e);
                }
                (index, result)
            })
            .buffered(workers)
            .map(|(index, result)| {
                on_done(index, &result);
                result
            })
            .collect()
            .await
    }
}

/// Whether `outer` names an ancestor of `nested` by whole dotted segments.
fn is_path_prefix(outer: &str, nested: &str) -> bool {
    nested
        .strip_prefix(outer)
        .map_or(false, |rest| rest.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::stage::tests::{FailingEnricher, FixedEnricher};
    use crate::enrich::types::{SkipReason, StageOutcome};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn stage(name: &'static str, target: &str, value: serde_json::Value) -> Stage {
        let (handler, _) = FixedEnricher::boxed(name, value);
        Stage::new("text", target, handler)
    }

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_duplicate_targets_rejected() {
        let err = Pipeline::new(vec![
            stage("language", "out", json!("eng")),
            stage("sentiment", "out", json!("pos")),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateTarget {
                field: "out".to_string(),
                first: "language",
                second: "sentiment",
            }
        );
    }

    #[test]
    fn test_nested_targets_rejected() {
        let err = Pipeline::new(vec![
            stage("language", "enrich", json!("eng")),
            stage("sentiment", "enrich.sentiment", json!("pos")),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::OverlappingTarget {
                outer: "enrich".to_string(),
                nested: "enrich.sentiment".to_string(),
                first: "language",
                second: "sentiment",
            }
        );

        // Reverse order is caught the same way
        let err = Pipeline::new(vec![
            stage("sentiment", "enrich.sentiment", json!("pos")),
            stage("language", "enrich", json!("eng")),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OverlappingTarget { first: "sentiment", second: "language", .. }
        ));
    }

    #[test]
    fn test_sibling_and_shared_prefix_targets_allowed() {
        assert!(Pipeline::new(vec![
            stage("language", "enrich.language", json!("eng")),
            stage("sentiment", "enrich.sentiment", json!("pos")),
            stage("categories", "ab", json!("x")),
            stage("entities", "a.b", json!([])),
        ])
        .is_ok());
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        assert_eq!(Pipeline::new(vec![]).unwrap_err(), ConfigError::NoStages);
    }

    #[tokio::test]
    async fn test_runs_stages_in_order() {
        let pipeline = Pipeline::new(vec![
            stage("language", "language", json!("eng")),
            stage("sentiment", "sentiment", json!("pos")),
        ])
        .unwrap();
        let mut d = doc(json!({"text": "I love this sentence so much I want to marry it!"}));

        let reports = pipeline.run(&mut d).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.outcome == StageOutcome::Enriched));
        let keys: Vec<&String> = d.as_map().keys().collect();
        assert_eq!(keys, ["text", "language", "sentiment"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let (handler, calls) = FixedEnricher::boxed("sentiment", json!("pos"));
        let pipeline = Pipeline::new(vec![
            stage("language", "language", json!("eng")),
            Stage::new("text", "category", Box::new(FailingEnricher)),
            Stage::new("text", "sentiment", handler),
        ])
        .unwrap();
        let mut d = doc(json!({"text": "abc"}));

        let err = pipeline.run(&mut d).await.unwrap_err();

        assert_eq!(err.stage(), "categories");
        assert!(d.has_field("language"));
        assert!(!d.has_field("sentiment"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_skipped_stages_reported() {
        let pipeline = Pipeline::new(vec![stage("language", "language", json!("eng"))]).unwrap();
        let mut d = doc(json!({"title": "no text"}));

        let reports = pipeline.run(&mut d).await.unwrap();
        assert_eq!(
            reports[0].outcome,
            StageOutcome::Skipped(SkipReason::MissingInput)
        );
        assert_eq!(d.into_value(), json!({"title": "no text"}));
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let pipeline = Pipeline::new(vec![stage("language", "language", json!("eng"))]).unwrap();
        let docs = vec![
            doc(json!({"id": 0, "text": "a"})),
            doc(json!({"id": 1, "language": "fra", "text": "b"})),
            doc(json!({"id": 2})),
            doc(json!({"id": 3, "text": "d"})),
        ];

        let seen = std::sync::Mutex::new(Vec::new());
        let results = pipeline
            .run_batch_with(docs, 3, |index, _| seen.lock().unwrap().push(index))
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().get("language"), Some(&json!("eng")));
        assert!(matches!(results[1], Err(EnrichError::AlreadyEnriched { .. })));
        assert!(!results[2].as_ref().unwrap().has_field("language"));
        assert_eq!(results[3].as_ref().unwrap().get("id"), Some(&json!(3)));
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }
}
