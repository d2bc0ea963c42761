//! Read-only vector index abstraction and its backends.

use futures::future::BoxFuture;

use crate::config::DistanceKind;
use crate::errors::RagError;
use crate::record::RetrievedChunk;

pub mod local;
pub mod qdrant;

/// Nearest-neighbor search over a persisted, read-only index.
///
/// Implementations are shared across concurrent queries (`Arc<dyn VectorIndex>`),
/// so `search` takes `&self` and must not mutate the index.
pub trait VectorIndex: Send + Sync {
    /// Returns at most `k` chunks ordered by descending similarity.
    ///
    /// Fewer stored documents than `k` is not an error: all of them are returned.
    ///
    /// # Errors
    /// - [`RagError::Config`] when `k == 0`.
    /// - [`RagError::VectorSizeMismatch`] when `query` does not match the index dimension.
    fn search<'a>(
        &'a self,
        query: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<RetrievedChunk>, RagError>>;

    /// Vector size of the stored embeddings, if known (an empty index has none).
    fn dimension(&self) -> Option<usize>;

    /// Human-readable location used in logs.
    fn describe(&self) -> String;
}

pub(crate) fn check_k(k: usize) -> Result<(), RagError> {
    if k == 0 {
        return Err(RagError::Config("k must be > 0".into()));
    }
    Ok(())
}

pub(crate) fn check_dimension(query: &[f32], dim: Option<usize>) -> Result<(), RagError> {
    match dim {
        Some(want) if query.len() != want => Err(RagError::VectorSizeMismatch {
            got: query.len(),
            want,
        }),
        _ => Ok(()),
    }
}

/// Maps a raw backend value onto the "higher is closer" score convention.
pub(crate) fn to_similarity(distance: DistanceKind, raw: f32) -> f32 {
    match distance {
        DistanceKind::Cosine | DistanceKind::Dot => raw,
        DistanceKind::Euclid => 1.0 / (1.0 + raw.max(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclid_distance_becomes_similarity() {
        assert_eq!(to_similarity(DistanceKind::Euclid, 0.0), 1.0);
        assert_eq!(to_similarity(DistanceKind::Euclid, 1.0), 0.5);
        assert!(to_similarity(DistanceKind::Euclid, 3.0) < to_similarity(DistanceKind::Euclid, 2.0));
        assert_eq!(to_similarity(DistanceKind::Cosine, 0.25), 0.25);
    }

    #[test]
    fn zero_k_and_wrong_dimension_are_rejected() {
        assert!(matches!(check_k(0), Err(RagError::Config(_))));
        assert!(check_k(1).is_ok());
        assert!(matches!(
            check_dimension(&[1.0, 2.0], Some(3)),
            Err(RagError::VectorSizeMismatch { got: 2, want: 3 })
        ));
        assert!(check_dimension(&[1.0], None).is_ok());
    }
}
