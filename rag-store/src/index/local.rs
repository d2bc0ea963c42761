//! In-memory index loaded from a JSONL file, searched exhaustively.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tracing::{debug, info, trace};

use super::{VectorIndex, check_dimension, check_k, to_similarity};
use crate::config::DistanceKind;
use crate::errors::RagError;
use crate::io_jsonl::read_index_rows;
use crate::record::{IndexRecord, RetrievedChunk};

/// File name looked up when the index location is a directory.
pub const INDEX_FILE_NAME: &str = "index.jsonl";

/// Exact brute-force kNN over rows held in memory.
#[derive(Debug)]
pub struct LocalIndex {
    source: String,
    distance: DistanceKind,
    dim: Option<usize>,
    rows: Vec<IndexRecord>,
}

impl LocalIndex {
    /// Opens the index at `location`.
    ///
    /// `location` is either a directory holding [`INDEX_FILE_NAME`] or a path
    /// to a `.jsonl` file. An existing empty file is a valid empty index.
    ///
    /// # Errors
    /// - [`RagError::IndexNotFound`] if nothing exists at the location.
    /// - [`RagError::Io`] / [`RagError::Parse`] for unreadable rows.
    /// - [`RagError::VectorSizeMismatch`] if rows disagree on dimension.
    pub fn open(location: impl AsRef<Path>, distance: DistanceKind) -> Result<Self, RagError> {
        let file = resolve_index_file(location.as_ref())?;
        let rows = read_index_rows(&file)?;
        let mut index = Self::from_records(rows, distance)?;
        index.source = file.display().to_string();
        info!(
            path = %index.source,
            rows = index.rows.len(),
            dim = ?index.dim,
            "local index opened"
        );
        Ok(index)
    }

    /// Builds an index from already-loaded records.
    ///
    /// # Errors
    /// [`RagError::VectorSizeMismatch`] if the records disagree on dimension.
    pub fn from_records(rows: Vec<IndexRecord>, distance: DistanceKind) -> Result<Self, RagError> {
        let dim = rows.first().map(|r| r.embedding.len());
        if let Some(want) = dim {
            if let Some(bad) = rows.iter().find(|r| r.embedding.len() != want) {
                return Err(RagError::VectorSizeMismatch {
                    got: bad.embedding.len(),
                    want,
                });
            }
        }
        Ok(Self {
            source: "<memory>".into(),
            distance,
            dim,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn search_exact(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, RagError> {
        check_k(k)?;
        if self.rows.is_empty() {
            debug!("local index is empty; no neighbors");
            return Ok(Vec::new());
        }
        check_dimension(query, self.dim)?;

        let mut scored: Vec<(f32, &IndexRecord)> = self
            .rows
            .iter()
            .map(|r| (score(self.distance, query, &r.embedding), r))
            .collect();

        // Stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        trace!(k, hits = scored.len(), "local search done");
        Ok(scored
            .into_iter()
            .map(|(score, r)| RetrievedChunk {
                content: r.text.clone(),
                score,
                metadata: r.metadata.clone(),
            })
            .collect())
    }
}

impl VectorIndex for LocalIndex {
    fn search<'a>(
        &'a self,
        query: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<RetrievedChunk>, RagError>> {
        Box::pin(async move { self.search_exact(query, k) })
    }

    fn dimension(&self) -> Option<usize> {
        self.dim
    }

    fn describe(&self) -> String {
        format!("local:{}", self.source)
    }
}

fn resolve_index_file(location: &Path) -> Result<PathBuf, RagError> {
    let not_found = || RagError::IndexNotFound(location.display().to_string());
    if location.is_dir() {
        let file = location.join(INDEX_FILE_NAME);
        if file.is_file() {
            return Ok(file);
        }
        return Err(not_found());
    }
    if location.is_file() {
        return Ok(location.to_path_buf());
    }
    Err(not_found())
}

fn score(distance: DistanceKind, a: &[f32], b: &[f32]) -> f32 {
    match distance {
        DistanceKind::Cosine => cosine(a, b),
        DistanceKind::Dot => dot(a, b),
        DistanceKind::Euclid => to_similarity(distance, euclid(a, b)),
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let na = dot(a, a).sqrt();
    let nb = dot(b, b).sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot(a, b) / (na * nb)
}

fn euclid(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample() -> Vec<IndexRecord> {
        vec![
            IndexRecord::new("east", vec![1.0, 0.0]).with_id("e"),
            IndexRecord::new("north", vec![0.0, 1.0]).with_id("n"),
            IndexRecord::new("north-east", vec![1.0, 1.0]).with_id("ne"),
        ]
    }

    fn ids(hits: &[RetrievedChunk]) -> Vec<String> {
        hits.iter().filter_map(|h| h.source_id()).collect()
    }

    #[tokio::test]
    async fn cosine_ranks_closest_first() {
        let idx = LocalIndex::from_records(sample(), DistanceKind::Cosine).unwrap();
        let hits = idx.search(&[1.0, 0.1], 2).await.unwrap();
        assert_eq!(ids(&hits), vec!["e", "ne"]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn euclid_scores_are_similarities() {
        let idx = LocalIndex::from_records(sample(), DistanceKind::Euclid).unwrap();
        let hits = idx.search(&[0.0, 1.0], 3).await.unwrap();
        assert_eq!(hits[0].source_id().as_deref(), Some("n"));
        assert_eq!(hits[0].score, 1.0);
    }

    #[tokio::test]
    async fn k_larger_than_index_returns_everything() {
        let idx = LocalIndex::from_records(sample()[..2].to_vec(), DistanceKind::Cosine).unwrap();
        let hits = idx.search(&[1.0, 1.0], 5).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let rows = vec![
            IndexRecord::new("a", vec![1.0, 0.0]).with_id("first"),
            IndexRecord::new("b", vec![1.0, 0.0]).with_id("second"),
        ];
        let idx = LocalIndex::from_records(rows, DistanceKind::Dot).unwrap();
        let hits = idx.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(ids(&hits), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn wrong_query_dimension_is_rejected() {
        let idx = LocalIndex::from_records(sample(), DistanceKind::Cosine).unwrap();
        let err = idx.search(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 3, want: 2 }));
    }

    #[test]
    fn mixed_dimensions_fail_to_load() {
        let rows = vec![
            IndexRecord::new("a", vec![1.0, 0.0]),
            IndexRecord::new("b", vec![1.0]),
        ];
        assert!(matches!(
            LocalIndex::from_records(rows, DistanceKind::Cosine),
            Err(RagError::VectorSizeMismatch { got: 1, want: 2 })
        ));
    }

    #[tokio::test]
    async fn open_directory_with_index_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(INDEX_FILE_NAME),
            "{\"text\":\"foo\",\"embedding\":[1.0,0.0],\"metadata\":{\"id\":\"doc1\"}}\n",
        )
        .unwrap();
        let idx = LocalIndex::open(dir.path(), DistanceKind::Cosine).unwrap();
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.dimension(), Some(2));
        assert!(idx.describe().ends_with(INDEX_FILE_NAME));
    }

    #[tokio::test]
    async fn empty_file_is_an_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("chunks.jsonl");
        fs::write(&file, "").unwrap();
        let idx = LocalIndex::open(&file, DistanceKind::Cosine).unwrap();
        assert!(idx.is_empty());
        assert!(idx.search(&[0.3, 0.4, 0.5], 5).await.unwrap().is_empty());
    }

    #[test]
    fn missing_location_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalIndex::open(dir.path().join("nope"), DistanceKind::Cosine).unwrap_err();
        assert!(matches!(err, RagError::IndexNotFound(_)));
        let err = LocalIndex::open(dir.path(), DistanceKind::Cosine).unwrap_err();
        assert!(matches!(err, RagError::IndexNotFound(_)));
    }
}
