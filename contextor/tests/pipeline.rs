//! End-to-end pipeline tests with deterministic fakes for the embedder and model
//! and a real in-memory `LocalIndex`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_llm_service::AiLlmError;
use ai_llm_service::services::ollama_service::OllamaError;
use contextor::{CancellationToken, CompletionBackend, Contextor, ContextorError};
use futures::future::BoxFuture;
use rag_store::{
    DistanceKind, EmbeddingsProvider, IndexRecord, LocalIndex, RagError, RetrievedChunk,
    VectorIndex,
};

/// Always returns the same unit vector.
struct FixedEmbedder(Vec<f32>);

impl EmbeddingsProvider for FixedEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        let v = self.0.clone();
        Box::pin(async move { Ok(v) })
    }
}

struct DownEmbedder;

impl EmbeddingsProvider for DownEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async { Err(RagError::Embedding("connection refused".into())) })
    }
}

/// Embedder whose model disagrees with the configured `EMBEDDING_DIM`.
struct WrongSizeEmbedder;

impl EmbeddingsProvider for WrongSizeEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async { Err(RagError::VectorSizeMismatch { got: 3, want: 2 }) })
    }
}

/// Index that reports a missing location on every search.
struct GoneIndex;

impl VectorIndex for GoneIndex {
    fn search<'a>(
        &'a self,
        _query: &'a [f32],
        _k: usize,
    ) -> BoxFuture<'a, Result<Vec<RetrievedChunk>, RagError>> {
        Box::pin(async { Err(RagError::IndexNotFound("/nowhere".into())) })
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    fn describe(&self) -> String {
        "gone".into()
    }
}

/// Deterministic model that records every prompt it receives.
#[derive(Default)]
struct RecordingModel {
    prompts: Mutex<Vec<String>>,
}

impl RecordingModel {
    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionBackend for RecordingModel {
    fn model(&self) -> &str {
        "fake-llm"
    }

    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AiLlmError>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Box::pin(async { Ok("4".to_string()) })
    }
}

struct TimeoutModel;

impl CompletionBackend for TimeoutModel {
    fn model(&self) -> &str {
        "slow-llm"
    }

    fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(async {
            Err(AiLlmError::Ollama(OllamaError::Timeout(
                "http://127.0.0.1:11434/api/generate".into(),
            )))
        })
    }
}

struct HangingModel;

impl CompletionBackend for HangingModel {
    fn model(&self) -> &str {
        "hanging-llm"
    }

    fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(futures::future::pending())
    }
}

fn index(rows: Vec<IndexRecord>) -> Arc<dyn VectorIndex> {
    Arc::new(LocalIndex::from_records(rows, DistanceKind::Cosine).unwrap())
}

fn foo_bar() -> Vec<IndexRecord> {
    vec![
        IndexRecord::new("foo", vec![1.0, 0.0]).with_id("doc1"),
        IndexRecord::new("bar", vec![0.8, 0.6]).with_id("doc2"),
    ]
}

fn contextor(
    rows: Vec<IndexRecord>,
    model: Arc<dyn CompletionBackend>,
    k: usize,
) -> Contextor {
    Contextor::new(
        Arc::new(FixedEmbedder(vec![1.0, 0.0])),
        index(rows),
        model,
        k,
    )
    .unwrap()
}

#[tokio::test]
async fn empty_index_asks_plain_question() {
    let model = Arc::new(RecordingModel::default());
    let ctx = contextor(vec![], model.clone(), 5);

    let answer = ctx
        .ask("What is 2+2?", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(model.prompts(), vec!["\nAnswer the question: What is 2+2?\n"]);
    assert!(answer.chunks.is_empty());
    assert!(answer.sources.is_empty());
    assert_eq!(answer.to_string(), "Response: 4\nSources: []");
}

#[tokio::test]
async fn retrieved_chunks_become_context_and_sources() {
    let model = Arc::new(RecordingModel::default());
    let ctx = contextor(foo_bar(), model.clone(), 5);

    let answer = ctx.ask("Q?", &CancellationToken::new()).await.unwrap();

    assert!(answer.prompt.contains("foo\n\n---\n\nbar"));
    assert!(answer.prompt.contains("based only on the following context"));
    assert_eq!(
        answer.sources,
        vec![Some("doc1".to_string()), Some("doc2".to_string())]
    );
    assert_eq!(
        answer.to_string(),
        "Response: 4\nSources: [\"doc1\",\"doc2\"]"
    );
    assert_eq!(model.prompts(), vec![answer.prompt.clone()]);
}

#[tokio::test]
async fn chunk_without_id_yields_absent_source() {
    let rows = vec![
        IndexRecord::new("foo", vec![1.0, 0.0]).with_id("doc1"),
        IndexRecord::new("anonymous", vec![0.0, 1.0]),
    ];
    let ctx = contextor(rows, Arc::new(RecordingModel::default()), 5);

    let answer = ctx.ask("Q?", &CancellationToken::new()).await.unwrap();

    assert_eq!(answer.sources.len(), answer.chunks.len());
    assert_eq!(answer.sources, vec![Some("doc1".to_string()), None]);
    assert!(answer.to_string().ends_with("[\"doc1\",null]"));
}

#[tokio::test]
async fn k_larger_than_index_returns_all_documents() {
    let ctx = contextor(foo_bar(), Arc::new(RecordingModel::default()), 5);
    let chunks = ctx.retrieve("anything").await.unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].score >= chunks[1].score);
}

#[tokio::test]
async fn k_limits_context_to_best_matches() {
    let model = Arc::new(RecordingModel::default());
    let ctx = contextor(foo_bar(), model.clone(), 1);

    let answer = ctx.ask("Q?", &CancellationToken::new()).await.unwrap();

    assert_eq!(answer.sources, vec![Some("doc1".to_string())]);
    assert!(!answer.prompt.contains("bar"));
}

#[tokio::test]
async fn same_query_twice_gives_identical_prompts() {
    let model = Arc::new(RecordingModel::default());
    let ctx = contextor(foo_bar(), model.clone(), 5);
    let cancel = CancellationToken::new();

    ctx.ask("Q?", &cancel).await.unwrap();
    ctx.ask("Q?", &cancel).await.unwrap();

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn concurrent_queries_share_one_contextor() {
    let model = Arc::new(RecordingModel::default());
    let ctx = contextor(foo_bar(), model.clone(), 5);

    let a = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.ask("first?", &CancellationToken::new()).await })
    };
    let b = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.ask("second?", &CancellationToken::new()).await })
    };

    assert!(a.await.unwrap().is_ok());
    assert!(b.await.unwrap().is_ok());
    assert_eq!(model.prompts().len(), 2);
}

#[tokio::test]
async fn blank_query_is_invalid_input() {
    let model = Arc::new(RecordingModel::default());
    let ctx = contextor(foo_bar(), model.clone(), 5);

    let err = ctx.ask("   ", &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, ContextorError::InvalidInput(_)));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn embedder_failure_surfaces_as_embedding_unavailable() {
    let model = Arc::new(RecordingModel::default());
    let ctx = Contextor::new(Arc::new(DownEmbedder), index(foo_bar()), model.clone(), 5).unwrap();

    let err = ctx.ask("Q?", &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, ContextorError::EmbeddingUnavailable(_)));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn embedding_size_mismatch_surfaces_as_embedding_unavailable() {
    let model = Arc::new(RecordingModel::default());
    let ctx =
        Contextor::new(Arc::new(WrongSizeEmbedder), index(foo_bar()), model.clone(), 5).unwrap();

    let err = ctx.ask("Q?", &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(
        err,
        ContextorError::EmbeddingUnavailable(RagError::VectorSizeMismatch { got: 3, want: 2 })
    ));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn missing_index_surfaces_as_index_not_found() {
    let ctx = Contextor::new(
        Arc::new(FixedEmbedder(vec![1.0, 0.0])),
        Arc::new(GoneIndex),
        Arc::new(RecordingModel::default()),
        5,
    )
    .unwrap();

    let err = ctx.ask("Q?", &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ContextorError::IndexNotFound(p) if p == "/nowhere"));
}

#[tokio::test]
async fn query_vector_of_wrong_size_is_a_retrieval_error() {
    let ctx = Contextor::new(
        Arc::new(FixedEmbedder(vec![1.0, 0.0, 0.0])),
        index(foo_bar()),
        Arc::new(RecordingModel::default()),
        5,
    )
    .unwrap();

    let err = ctx.ask("Q?", &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(
        err,
        ContextorError::Retrieval(RagError::VectorSizeMismatch { got: 3, want: 2 })
    ));
}

#[tokio::test]
async fn model_failure_surfaces_as_model_invocation_failed() {
    let ctx = contextor(foo_bar(), Arc::new(TimeoutModel), 5);

    let err = ctx.ask("Q?", &CancellationToken::new()).await.unwrap_err();

    match err {
        ContextorError::ModelInvocationFailed(inner) => assert!(inner.is_timeout()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_during_model_call_reports_cancelled() {
    let ctx = contextor(foo_bar(), Arc::new(HangingModel), 5);
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = ctx.ask("Q?", &token).await.unwrap_err();
    assert!(matches!(err, ContextorError::Cancelled));
}

#[tokio::test]
async fn already_cancelled_token_stops_before_embedding() {
    let model = Arc::new(RecordingModel::default());
    let ctx = contextor(foo_bar(), model.clone(), 5);
    let token = CancellationToken::new();
    token.cancel();

    let err = ctx.ask("Q?", &token).await.unwrap_err();
    assert!(matches!(err, ContextorError::Cancelled));
    assert!(model.prompts().is_empty());
}

#[test]
fn zero_k_is_rejected_at_construction() {
    let res = Contextor::new(
        Arc::new(FixedEmbedder(vec![1.0])),
        index(vec![]),
        Arc::new(RecordingModel::default()),
        0,
    );
    assert!(matches!(res, Err(ContextorError::Config(_))));
}
