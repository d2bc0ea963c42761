//! Read-only adapter over a Qdrant collection.
//!
//! Keeps every `qdrant-client` call behind [`QdrantIndex`] so the rest of the
//! workspace only sees [`VectorIndex`].

use std::collections::HashMap;

use futures::future::BoxFuture;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::value::Kind as K;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    Distance, SearchParamsBuilder, SearchPointsBuilder, Value as QValue, VectorParams,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{VectorIndex, check_dimension, check_k, to_similarity};
use crate::config::DistanceKind;
use crate::errors::RagError;
use crate::record::RetrievedChunk;

/// Payload keys probed, in order, for the chunk text.
const CONTENT_KEYS: [&str; 2] = ["text", "page_content"];

/// A Qdrant collection used as a read-only vector index.
pub struct QdrantIndex {
    client: Qdrant,
    url: String,
    collection: String,
    distance: DistanceKind,
    exact: bool,
    dim: Option<usize>,
}

impl QdrantIndex {
    /// Connects and verifies that `collection` exists.
    ///
    /// Scores are interpreted with the collection's own distance when Qdrant
    /// reports one; `distance` is only the fallback.
    ///
    /// # Errors
    /// - [`RagError::IndexNotFound`] if the collection does not exist.
    /// - [`RagError::Config`] if the collection uses a distance with no score mapping.
    /// - [`RagError::Qdrant`] on client or transport failures.
    pub async fn open(
        url: &str,
        api_key: Option<&str>,
        collection: &str,
        distance: DistanceKind,
        exact: bool,
    ) -> Result<Self, RagError> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key.to_string());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let exists = client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if !exists {
            return Err(RagError::IndexNotFound(format!("{url}/collections/{collection}")));
        }

        let params: Option<VectorParams> = match client.collection_info(collection).await {
            Ok(info) => info
                .result
                .and_then(|i| i.config)
                .and_then(|c| c.params)
                .and_then(|p| p.vectors_config)
                .and_then(|v| v.config)
                .and_then(|c| match c {
                    VectorsConfigKind::Params(p) => Some(p),
                    VectorsConfigKind::ParamsMap(_) => None,
                }),
            Err(err) => {
                warn!("collection_info failed for '{}': {}", collection, err);
                None
            }
        };
        let dim = params.as_ref().and_then(|p| usize::try_from(p.size).ok());
        let distance = resolve_distance(distance, params.as_ref().map(VectorParams::distance))?;

        info!(
            url,
            collection,
            dim = ?dim,
            distance = ?distance,
            "qdrant index opened"
        );

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
            distance,
            exact,
            dim,
        })
    }

    async fn search_points(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, RagError> {
        check_k(k)?;
        check_dimension(query, self.dim)?;

        let mut builder = SearchPointsBuilder::new(&self.collection, query.to_vec(), k as u64)
            .with_payload(true);
        if self.exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let out = rank_hits(
            self.distance,
            res.result.into_iter().map(|p| (p.score, p.payload)),
        );

        debug!("qdrant search completed: {} hits", out.len());
        Ok(out)
    }
}

impl VectorIndex for QdrantIndex {
    fn search<'a>(
        &'a self,
        query: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<RetrievedChunk>, RagError>> {
        Box::pin(self.search_points(query, k))
    }

    fn dimension(&self) -> Option<usize> {
        self.dim
    }

    fn describe(&self) -> String {
        format!("qdrant:{}/{}", self.url, self.collection)
    }
}

/// Picks the metric used to read Qdrant scores.
///
/// The collection's reported distance wins over `configured`; an unknown or
/// missing one falls back to it.
fn resolve_distance(
    configured: DistanceKind,
    reported: Option<Distance>,
) -> Result<DistanceKind, RagError> {
    let actual = match reported {
        None | Some(Distance::UnknownDistance) => return Ok(configured),
        Some(Distance::Cosine) => DistanceKind::Cosine,
        Some(Distance::Dot) => DistanceKind::Dot,
        Some(Distance::Euclid) => DistanceKind::Euclid,
        Some(Distance::Manhattan) => {
            return Err(RagError::Config(
                "collection uses manhattan distance, which has no similarity mapping".into(),
            ));
        }
    };
    if actual != configured {
        warn!(
            "RAG_DISTANCE={configured:?} but collection uses {actual:?}; using {actual:?}"
        );
    }
    Ok(actual)
}

/// Maps raw Qdrant scores to similarities and orders them best first.
///
/// Euclid hits arrive ascending by distance, so the mapped scores must be
/// re-sorted. The sort is stable.
fn rank_hits(
    distance: DistanceKind,
    hits: impl IntoIterator<Item = (f32, HashMap<String, QValue>)>,
) -> Vec<RetrievedChunk> {
    let mut out: Vec<RetrievedChunk> = hits
        .into_iter()
        .map(|(score, payload)| payload_to_chunk(to_similarity(distance, score), payload))
        .collect();
    out.sort_by(|a, b| b.score.total_cmp(&a.score));
    out
}

/// Splits a point payload into chunk text and metadata.
///
/// Text comes from the first of [`CONTENT_KEYS`] holding a string. Metadata is
/// the nested `"metadata"` object when present, otherwise every remaining key.
fn payload_to_chunk(score: f32, payload: HashMap<String, QValue>) -> RetrievedChunk {
    let mut fields = qpayload_to_json(payload);

    let found = CONTENT_KEYS.iter().find_map(|k| match fields.get(*k) {
        Some(Value::String(s)) => Some((*k, s.clone())),
        _ => None,
    });
    let content = match found {
        Some((key, text)) => {
            fields.remove(key);
            text
        }
        None => String::new(),
    };

    let metadata = match fields.remove("metadata") {
        Some(Value::Object(m)) => m,
        Some(other) => {
            fields.insert("metadata".into(), other);
            fields
        }
        None => fields,
    };

    RetrievedChunk {
        content,
        score,
        metadata,
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into a JSON map.
fn qpayload_to_json(p: HashMap<String, QValue>) -> Map<String, Value> {
    p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect()
}

fn qvalue_to_json(v: QValue) -> Value {
    match v.kind {
        Some(K::StringValue(s)) => Value::String(s),
        Some(K::IntegerValue(i)) => Value::Number(i.into()),
        Some(K::DoubleValue(f)) => serde_json::json!(f),
        Some(K::BoolValue(b)) => Value::Bool(b),
        Some(K::ListValue(l)) => Value::Array(l.values.into_iter().map(qvalue_to_json).collect()),
        Some(K::StructValue(s)) => Value::Object(qpayload_to_json(s.fields)),
        Some(K::NullValue(_)) | None => Value::Null,
    }
}
