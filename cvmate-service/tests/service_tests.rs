//! End-to-end tests: upload → ingest → query/generate, with a
//! deterministic stub embedder and mock chat model.

use std::sync::Arc;

use async_trait::async_trait;
use cvmate_model::MockChatModel;
use cvmate_rag::{
    EmbeddingProvider, InMemoryIndex, RagConfig, RagError, RagPipeline, RecursiveChunker,
};
#[cfg(feature = "pdf")]
use cvmate_service::PdfExtractor;
use cvmate_service::{
    ApplicationRecord, ArtifactKind, ChatRecord, CvService, DocumentStatus, DocumentStore,
    HistoryError, HistorySink, IngestionManager, InMemoryDocumentStore, InMemoryFetcher,
    InMemoryHistory, PlainTextExtractor, ServiceConfig, ServiceError, TextExtractor,
};

const DIM: usize = 64;

/// Deterministic bag-of-trigrams embedding.
struct StubEmbedder;

fn stub_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    for window in chars.windows(3) {
        let mut hash = 0usize;
        for c in window {
            hash = hash.wrapping_mul(31).wrapping_add(*c as usize);
        }
        v[hash % DIM] += 1.0;
    }
    v
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> cvmate_rag::Result<Vec<f32>> {
        Ok(stub_vector(text))
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn fingerprint(&self) -> String {
        "stub/trigram@64".to_string()
    }
}

/// Everything a test scenario needs, wired with in-memory collaborators.
struct Harness {
    service: CvService,
    ingestion: IngestionManager,
    fetcher: Arc<InMemoryFetcher>,
    documents: Arc<InMemoryDocumentStore>,
    history: Arc<InMemoryHistory>,
    config: ServiceConfig,
    pipeline: Arc<RagPipeline>,
}

impl Harness {
    /// A second service over the same pipeline and documents, with a
    /// different history sink.
    fn service_with_history(
        &self,
        model: MockChatModel,
        history: Arc<dyn HistorySink>,
    ) -> CvService {
        CvService::new(
            self.config.clone(),
            Arc::clone(&self.pipeline),
            Arc::new(model),
            self.documents.clone(),
            history,
        )
    }
}

fn harness(model: MockChatModel) -> Harness {
    harness_with_extractor(model, Arc::new(PlainTextExtractor))
}

fn harness_with_extractor(model: MockChatModel, extractor: Arc<dyn TextExtractor>) -> Harness {
    let rag = RagConfig::builder().chunk_size(500).chunk_overlap(50).build().unwrap();
    let config = ServiceConfig { rag: rag.clone(), ..ServiceConfig::default() };

    let pipeline = Arc::new(
        RagPipeline::builder()
            .config(rag.clone())
            .embedding_provider(Arc::new(StubEmbedder))
            .index(Arc::new(InMemoryIndex::new()))
            .chunker(Arc::new(RecursiveChunker::new(rag.chunk_size, rag.chunk_overlap).unwrap()))
            .build()
            .unwrap(),
    );

    let fetcher = Arc::new(InMemoryFetcher::new());
    let documents = Arc::new(InMemoryDocumentStore::new());
    let history = Arc::new(InMemoryHistory::new());

    let ingestion = IngestionManager::new(
        Arc::clone(&pipeline),
        fetcher.clone(),
        extractor,
        documents.clone(),
    );
    let service = CvService::new(
        config.clone(),
        Arc::clone(&pipeline),
        Arc::new(model),
        documents.clone(),
        history.clone(),
    );

    Harness { service, ingestion, fetcher, documents, history, config, pipeline }
}

/// A three-page CV, pages separated by form feeds.
fn three_page_cv() -> Vec<u8> {
    let pages = [
        "Jane Doe, software engineer. Summary of professional experience and skills.",
        "Education: MSc in Computer Science from Aalto University, graduated 2015.",
        "References and publications available on request.",
    ];
    pages.join("\u{0c}").into_bytes()
}

#[tokio::test]
async fn upload_reaches_indexed_and_query_finds_page_two() {
    let h = harness(MockChatModel::echo());
    h.fetcher.put("blob://cv/1", three_page_cv()).await;

    h.ingestion.submit(1, "blob://cv/1").await;
    h.ingestion.wait(1).await;
    assert_eq!(h.documents.status(1).await, Some(DocumentStatus::Indexed));

    // The echo model returns the assembled prompt, so the answer contains
    // whatever context was retrieved.
    let answer = h.service.answer_question(1, "Where did Jane study?").await.unwrap();
    assert!(answer.contains("Aalto University"), "answer missing page 2 text: {answer}");
}

#[tokio::test]
async fn query_before_indexing_completes_is_not_ready() {
    let h = harness(MockChatModel::echo());

    for status in [DocumentStatus::Uploaded, DocumentStatus::Chunking, DocumentStatus::Embedding]
    {
        h.documents.set_status(2, status).await;
        let err = h.service.answer_question(2, "anything").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotReady));
    }
}

#[tokio::test]
async fn query_with_no_document_is_collection_not_found() {
    let h = harness(MockChatModel::echo());
    let err = h.service.answer_question(3, "anything").await.unwrap_err();
    assert!(matches!(err, ServiceError::Rag(RagError::CollectionNotFound { .. })));
}

#[tokio::test]
async fn removing_document_drops_the_collection() {
    let h = harness(MockChatModel::echo());
    h.fetcher.put("blob://cv/4", three_page_cv()).await;
    h.ingestion.submit(4, "blob://cv/4").await;
    h.ingestion.wait(4).await;

    h.ingestion.remove(4).await.unwrap();
    assert_eq!(h.documents.status(4).await, None);

    let err = h.service.answer_question(4, "anything").await.unwrap_err();
    assert!(matches!(err, ServiceError::Rag(RagError::CollectionNotFound { .. })));

    // Idempotent.
    h.ingestion.remove(4).await.unwrap();
}

#[tokio::test]
async fn failed_ingestion_marks_failed_and_keeps_previous_index() {
    let h = harness(MockChatModel::echo());
    h.fetcher.put("blob://cv/5", three_page_cv()).await;
    h.ingestion.submit(5, "blob://cv/5").await;
    h.ingestion.wait(5).await;

    // Second upload points at a missing blob; fetch fails.
    h.ingestion.submit(5, "blob://cv/5-missing").await;
    h.ingestion.wait(5).await;
    assert!(matches!(h.documents.status(5).await, Some(DocumentStatus::Failed { .. })));

    // The previous index is still intact and queryable.
    let answer = h.service.answer_question(5, "Where did Jane study?").await.unwrap();
    assert!(answer.contains("Aalto University"));
}

#[tokio::test]
async fn reupload_replaces_the_previous_index() {
    let h = harness(MockChatModel::echo());
    h.fetcher.put("blob://cv/6", b"Old CV about basket weaving.".to_vec()).await;
    h.ingestion.submit(6, "blob://cv/6").await;
    h.ingestion.wait(6).await;

    h.fetcher.put("blob://cv/6", b"New CV about rocket science.".to_vec()).await;
    h.ingestion.submit(6, "blob://cv/6").await;
    h.ingestion.wait(6).await;

    let answer = h.service.answer_question(6, "what is the CV about").await.unwrap();
    assert!(answer.contains("rocket science"));
    assert!(!answer.contains("basket weaving"));
}

#[tokio::test]
async fn email_generation_parses_subject_and_formats_body() {
    let h = harness(MockChatModel::with_response(
        "SUBJECT: Application for Senior Engineer\n\nBODY:\nDear team,\n\nI bring **ten years** of experience.\n\nBest,\nJane",
    ));
    h.fetcher.put("blob://cv/7", three_page_cv()).await;
    h.ingestion.submit(7, "blob://cv/7").await;
    h.ingestion.wait(7).await;

    let draft = h
        .service
        .generate_application(7, "Senior Engineer role", ArtifactKind::Email)
        .await
        .unwrap();
    assert_eq!(draft.subject.as_deref(), Some("Application for Senior Engineer"));
    assert!(draft.content.contains("<strong>ten years</strong>"));
    assert!(draft.content.contains("<br>"));
}

#[tokio::test]
async fn malformed_email_output_falls_back_to_default_subject() {
    let h = harness(MockChatModel::with_response("Unstructured model ramble."));
    h.fetcher.put("blob://cv/8", three_page_cv()).await;
    h.ingestion.submit(8, "blob://cv/8").await;
    h.ingestion.wait(8).await;

    let draft =
        h.service.generate_application(8, "Any role", ArtifactKind::Email).await.unwrap();
    assert_eq!(draft.subject.as_deref(), Some("Application for Position"));
    assert_eq!(draft.content, "Unstructured model ramble.");
}

#[tokio::test]
async fn cover_letter_has_no_subject_and_html_body() {
    let h = harness(MockChatModel::with_response("Dear hiring manager,\nI am *excited* to apply."));
    h.fetcher.put("blob://cv/9", three_page_cv()).await;
    h.ingestion.submit(9, "blob://cv/9").await;
    h.ingestion.wait(9).await;

    let draft = h
        .service
        .generate_application(9, "Any role", ArtifactKind::CoverLetter)
        .await
        .unwrap();
    assert_eq!(draft.subject, None);
    assert_eq!(
        draft.content,
        "Dear hiring manager,<br>I am <em>excited</em> to apply."
    );
}

#[tokio::test]
async fn chat_and_application_history_are_recorded() {
    let h = harness(MockChatModel::with_response("A fine answer."));
    h.fetcher.put("blob://cv/10", three_page_cv()).await;
    h.ingestion.submit(10, "blob://cv/10").await;
    h.ingestion.wait(10).await;

    h.service.answer_question(10, "What does Jane do?").await.unwrap();
    h.service.generate_application(10, "A role", ArtifactKind::CoverLetter).await.unwrap();

    let chats = h.history.chats().await;
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].user_id, 10);
    assert_eq!(chats[0].question, "What does Jane do?");
    assert_eq!(chats[0].answer, "A fine answer.");

    let applications = h.history.applications().await;
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0].kind, ArtifactKind::CoverLetter);
}

#[tokio::test]
async fn users_never_see_each_others_cv() {
    let h = harness(MockChatModel::echo());
    h.fetcher.put("blob://cv/a", b"Alice the astronomer, expert in telescopes.".to_vec()).await;
    h.fetcher.put("blob://cv/b", b"Bob the baker, expert in sourdough.".to_vec()).await;

    h.ingestion.submit(11, "blob://cv/a").await;
    h.ingestion.submit(12, "blob://cv/b").await;
    h.ingestion.wait(11).await;
    h.ingestion.wait(12).await;

    let alice = h.service.answer_question(11, "what is this person expert in").await.unwrap();
    assert!(alice.contains("telescopes"));
    assert!(!alice.contains("sourdough"));

    let bob = h.service.answer_question(12, "what is this person expert in").await.unwrap();
    assert!(bob.contains("sourdough"));
    assert!(!bob.contains("telescopes"));
}

/// A one-page PDF carrying `text`, built object by object.
#[cfg(feature = "pdf")]
fn pdf_cv(text: &str) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 13.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn pdf_upload_reaches_indexed_and_is_queryable() {
    let h = harness_with_extractor(MockChatModel::echo(), Arc::new(PdfExtractor));
    h.fetcher
        .put("blob://cv/13", pdf_cv("Jane Doe studied astrophysics at Aalto University"))
        .await;

    h.ingestion.submit(13, "blob://cv/13").await;
    h.ingestion.wait(13).await;
    assert_eq!(h.documents.status(13).await, Some(DocumentStatus::Indexed));

    let answer = h.service.answer_question(13, "What did Jane study?").await.unwrap();
    assert!(answer.contains("Aalto"), "answer missing PDF text: {answer}");
}

#[tokio::test]
async fn finished_ingestions_are_reaped_on_next_submit() {
    let h = harness(MockChatModel::echo());
    h.fetcher.put("blob://cv/14", three_page_cv()).await;
    h.ingestion.submit(14, "blob://cv/14").await;

    // Let the ingestion finish without ever calling wait(), as a
    // fire-and-forget caller would.
    while h.documents.status(14).await != Some(DocumentStatus::Indexed) {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(h.ingestion.in_flight_count().await, 1);

    h.fetcher.put("blob://cv/15", three_page_cv()).await;
    h.ingestion.submit(15, "blob://cv/15").await;
    h.ingestion.wait(15).await;

    // Submitting reaped user 14's finished task; wait() removed user 15's.
    assert_eq!(h.ingestion.in_flight_count().await, 0);
}

struct FailingHistory;

#[async_trait]
impl HistorySink for FailingHistory {
    async fn append_chat(&self, _record: ChatRecord) -> Result<(), HistoryError> {
        Err(HistoryError("history store offline".to_string()))
    }

    async fn append_application(&self, _record: ApplicationRecord) -> Result<(), HistoryError> {
        Err(HistoryError("history store offline".to_string()))
    }
}

#[tokio::test]
async fn history_write_failure_does_not_fail_the_operation() {
    let h = harness(MockChatModel::with_response("A fine answer."));
    h.fetcher.put("blob://cv/16", three_page_cv()).await;
    h.ingestion.submit(16, "blob://cv/16").await;
    h.ingestion.wait(16).await;

    let service = h.service_with_history(
        MockChatModel::with_response("A fine answer."),
        Arc::new(FailingHistory),
    );

    let answer = service.answer_question(16, "What does Jane do?").await.unwrap();
    assert_eq!(answer, "A fine answer.");

    let draft =
        service.generate_application(16, "A role", ArtifactKind::CoverLetter).await.unwrap();
    assert!(!draft.content.is_empty());
}
