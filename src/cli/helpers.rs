//! Shared helper functions for CLI commands.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use textenrich::models::Document;

/// Read documents from a file, or stdin when the path is `-`.
pub async fn read_documents(path: &Path) -> anyhow::Result<Vec<Document>> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    parse_documents(&contents).with_context(|| format!("Invalid input in {}", path.display()))
}

/// Parse a JSON object, a JSON array of objects, or a stream of objects
/// (JSON lines).
pub fn parse_documents(contents: &str) -> anyhow::Result<Vec<Document>> {
    let mut docs = Vec::new();
    for (index, value) in serde_json::Deserializer::from_str(contents)
        .into_iter::<Value>()
        .enumerate()
    {
        let value = value.with_context(|| format!("value {} is not valid JSON", index + 1))?;
        match value {
            Value::Array(items) => {
                for item in items {
                    docs.push(Document::from_value(item)?);
                }
            }
            other => docs.push(Document::from_value(other)?),
        }
    }
    Ok(docs)
}

/// Write documents as JSON lines.
pub fn write_documents<W: Write>(mut writer: W, docs: &[Document]) -> anyhow::Result<()> {
    for doc in docs {
        serde_json::to_writer(&mut writer, doc)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Truncate a string for progress display.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
