//! Strict JSONL reader for persisted index rows.
//!
//! Row shape: `{"text": "...", "embedding": [..], "metadata": {..}}`.
//! `metadata` is optional. A top-level `"id"` is accepted too and copied into
//! `metadata["id"]` unless the metadata already carries one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::RagError;
use crate::record::IndexRecord;

#[derive(Deserialize)]
struct IndexRow {
    #[serde(default)]
    id: Option<Value>,
    text: String,
    embedding: Vec<f32>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

/// Reads every index row of `jsonl_path`.
///
/// - Blank lines are ignored.
/// - A malformed row or an empty `embedding` fails the whole read.
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be read.
/// - [`RagError::Parse`] with the 1-based line number for bad rows.
pub fn read_index_rows(jsonl_path: impl AsRef<Path>) -> Result<Vec<IndexRecord>, RagError> {
    let path = jsonl_path.as_ref();
    info!("Reading index rows: {:?}", path);

    let reader = BufReader::new(File::open(path)?);

    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let row: IndexRow = serde_json::from_str(&line)
            .map_err(|e| RagError::Parse(format!("line {} parse error: {}", i + 1, e)))?;

        if row.embedding.is_empty() {
            return Err(RagError::Parse(format!("line {}: empty embedding", i + 1)));
        }

        let mut metadata = row.metadata.unwrap_or_default();
        if let Some(id) = row.id {
            metadata.entry("id").or_insert(id);
        }

        out.push(IndexRecord {
            text: row.text,
            embedding: row.embedding,
            metadata,
        });
    }

    debug!("Loaded {} index rows", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_tmp(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_rows_and_skips_blank_lines() {
        let f = write_tmp(
            r#"{"text":"foo","embedding":[1.0,0.0],"metadata":{"id":"doc1"}}

{"text":"bar","embedding":[0.0,1.0]}
"#,
        );
        let rows = read_index_rows(f.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].metadata.get("id"), Some(&json!("doc1")));
        assert!(rows[1].metadata.is_empty());
    }

    #[test]
    fn top_level_id_does_not_override_metadata() {
        let f = write_tmp(
            r#"{"id":"outer","text":"a","embedding":[1.0],"metadata":{"id":"inner"}}
{"id":7,"text":"b","embedding":[1.0]}
"#,
        );
        let rows = read_index_rows(f.path()).unwrap();
        assert_eq!(rows[0].metadata.get("id"), Some(&json!("inner")));
        assert_eq!(rows[1].metadata.get("id"), Some(&json!(7)));
    }

    #[test]
    fn bad_row_reports_line_number() {
        let f = write_tmp("{\"text\":\"ok\",\"embedding\":[1.0]}\n{\"text\":1}\n");
        match read_index_rows(f.path()) {
            Err(RagError::Parse(msg)) => assert!(msg.starts_with("line 2"), "{msg}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_embedding_is_rejected() {
        let f = write_tmp("{\"text\":\"x\",\"embedding\":[]}\n");
        assert!(matches!(read_index_rows(f.path()), Err(RagError::Parse(_))));
    }
}
