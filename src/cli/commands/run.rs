//! Run the enrichment pipeline over input documents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use textenrich::api::ApiClient;
use textenrich::config::Config;
use textenrich::enrich::Pipeline;

use crate::cli::helpers::{read_documents, truncate, write_documents};

pub async fn cmd_run(
    config: &Config,
    inputs: &[PathBuf],
    workers: Option<usize>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    if config.stages.is_empty() {
        anyhow::bail!(
            "No stages configured. Add [[stages]] entries to {}",
            config
                .source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "textenrich.toml".to_string())
        );
    }

    let mut docs = Vec::new();
    for input in inputs {
        docs.extend(read_documents(input).await?);
    }
    if docs.is_empty() {
        eprintln!("{} No documents to process", style("!").yellow());
        return Ok(());
    }

    let client = Arc::new(ApiClient::new(config.api.clone())?);
    let pipeline = match Pipeline::from_config(&config.stages, client.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            client.close().await;
            return Err(e.into());
        }
    };

    let workers = workers.unwrap_or(config.workers).max(1);
    eprintln!(
        "{} Enriching {} documents with {} stages ({} workers)",
        style("→").cyan(),
        docs.len(),
        pipeline.stages().len(),
        workers
    );

    let pb = ProgressBar::new(docs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("█▓░"),
    );
    pb.set_message("Enriching...");

    let results = pipeline
        .run_batch_with(docs, workers, |index, result| {
            if let Err(e) = result {
                pb.println(format!(
                    "{} document {}: {}",
                    style("✗").red(),
                    index + 1,
                    truncate(&e.to_string(), 200)
                ));
            }
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();
    client.close().await;

    let total = results.len();
    let enriched: Vec<_> = results.into_iter().filter_map(Result::ok).collect();
    let failed = total - enriched.len();

    match output {
        Some(path) => {
            let mut buf = Vec::new();
            write_documents(&mut buf, &enriched)?;
            tokio::fs::write(path, buf)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => write_documents(std::io::stdout().lock(), &enriched)?,
    }

    if failed > 0 {
        eprintln!(
            "{} Enrichment complete: {} succeeded, {} failed",
            style("!").yellow(),
            enriched.len(),
            failed
        );
        anyhow::bail!("{} of {} documents failed", failed, total);
    }

    eprintln!(
        "{} Enrichment complete: {} documents",
        style("✓").green(),
        enriched.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use textenrich::enrich::{SimpleStageConfig, StageConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn language_config() -> Config {
        Config {
            stages: vec![StageConfig::Language(SimpleStageConfig {
                field: "text".to_string(),
                target_field: None,
            })],
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_unreadable_input_fails_before_client_is_built() {
        // No API key: building a client first would fail with a config error
        let config = language_config();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let err = cmd_run(&config, &[missing], None, None).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"), "{}", err);
    }

    #[tokio::test]
    async fn test_writes_enriched_documents_to_output_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/language"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "languageDetections": [{"language": "eng"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let mut config = language_config();
        config.api = config.api.with_url(&format!("{}/rest/v1", server.uri()));

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("docs.jsonl");
        let output = dir.path().join("out.jsonl");
        std::fs::write(&input, "{\"text\": \"one\"}\n{\"text\": \"two\"}\n").unwrap();

        cmd_run(&config, &[input], Some(2), Some(&output)).await.unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "{\"text\":\"one\",\"ros_language\":\"eng\"}\n{\"text\":\"two\",\"ros_language\":\"eng\"}\n"
        );
    }
}
