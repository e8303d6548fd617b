//! End-to-end router scenarios against injected doubles.

mod common;

use std::sync::Arc;

use serde_json::json;

use abhilekh_search::{Level, SearchError, SearchRequest, SearchRouter, SearchType};
use abhilekh_store::{Collection, Hit, RawFilters};
use common::{FailingClassifier, FailingEmbedder, FixedClassifier, MockEmbedder, MockStore};

fn video_hit(title: &str) -> Hit {
    Hit {
        id: "yt-abc123".into(),
        score: 2.1,
        source: json!({
            "vidID": "yt-abc123",
            "vidTitle": title,
            "transcriptEmbedding": [0.1, 0.2, 0.3]
        }),
    }
}

fn snippet_hit(transcript_id: &str, vid_id: &str) -> Hit {
    Hit {
        id: transcript_id.into(),
        score: 1.0,
        source: json!({
            "transcriptID": transcript_id,
            "vidID": vid_id,
            "transcriptSnippet": "केही पाठ",
            "snippetEmbedding": [0.4, 0.5]
        }),
    }
}

fn parent_video() -> serde_json::Value {
    json!({
        "vidID": "yt-abc123",
        "transcriptJson": [{ "alternatives": [{ "transcript": "नमस्ते", "confidence": 0.9 }] }],
        "englishTranscriptJson": [{ "alternatives": [{ "transcript": "hello", "confidence": 0.9 }] }]
    })
}

fn router(
    classifier: Arc<FixedClassifier>,
    embedder: Arc<MockEmbedder>,
    store: Arc<MockStore>,
) -> SearchRouter {
    SearchRouter::new(classifier, embedder, store)
}

// ── Scenario: pure keyword ────────────────────────────────────────────

#[tokio::test]
async fn pure_keyword_query_routes_to_lexical_search() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![video_hit("Pashupatinath Temple Visit")]));
    let router = router(classifier.clone(), embedder.clone(), store.clone());

    let envelope = router
        .search(&SearchRequest {
            query: "pashupatinath temple".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(envelope.metadata.search_type, "keyword");
    assert_eq!(envelope.results[0]["vidTitle"], "Pashupatinath Temple Visit");
    // pure keyword mode never embeds
    assert_eq!(embedder.call_count(), 0);

    let (collection, body) = store.last_search_body().unwrap();
    assert_eq!(collection, Collection::Videos);
    assert_eq!(
        body["query"]["bool"]["must"][0]["multi_match"]["query"],
        "pashupatinath temple"
    );
}

// ── Scenario: forced semantic ─────────────────────────────────────────

#[tokio::test]
async fn question_word_forces_semantic_despite_keyword_classification() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![video_hit("Teej Rituals")]));
    let router = router(classifier, embedder.clone(), store.clone());

    let envelope = router
        .search(&SearchRequest {
            query: "what rituals happen during Teej?".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(envelope.metadata.search_type, "semantic");
    assert_eq!(embedder.call_count(), 1);

    // the dispatched body is the script-scored vector request
    let (_, body) = store.last_search_body().unwrap();
    assert!(body["query"]["script_score"].is_object());
}

#[tokio::test]
async fn long_query_forces_combined_despite_keyword_classification() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![]));
    let router = router(classifier, embedder.clone(), store.clone());

    let envelope = router
        .search(&SearchRequest {
            query: "temple festival rituals morning prayers offerings crowds".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(envelope.metadata.search_type, "combined");
    assert_eq!(embedder.call_count(), 1);

    let (_, body) = store.last_search_body().unwrap();
    assert_eq!(body["query"]["bool"]["minimum_should_match"], 1);
}

// ── Scenario: oversized page / missing query ──────────────────────────

#[tokio::test]
async fn oversized_page_is_rejected_before_any_collaborator_call() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![]));
    let router = router(classifier.clone(), embedder.clone(), store.clone());

    let err = router
        .search(&SearchRequest {
            query: "temple".into(),
            size: 100,
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Maximum page size is 50");
    assert!(err.is_validation());
    assert_eq!(classifier.call_count(), 0);
    assert_eq!(embedder.call_count(), 0);
    assert_eq!(store.search_call_count(), 0);
}

#[tokio::test]
async fn missing_query_is_rejected() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![]));
    let router = router(classifier.clone(), embedder, store.clone());

    let err = router
        .search(&SearchRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Missing query parameter");
    assert_eq!(classifier.call_count(), 0);
    assert_eq!(store.search_call_count(), 0);
}

// ── No-vector-leak ────────────────────────────────────────────────────

#[tokio::test]
async fn embedding_fields_never_reach_the_client() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Snippet));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(
        MockStore::new(vec![snippet_hit("t-1", "yt-abc123")])
            .with_video("yt-abc123", parent_video()),
    );
    let router = router(classifier, embedder, store);

    let envelope = router
        .search(&SearchRequest {
            query: "earthquake stories".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    for result in &envelope.results {
        assert!(result.get("snippetEmbedding").is_none());
        assert!(result.get("transcriptEmbedding").is_none());
    }
}

// ── Snippet enrichment ────────────────────────────────────────────────

#[tokio::test]
async fn snippet_hits_are_enriched_with_parent_transcripts() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Snippet));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(
        MockStore::new(vec![
            snippet_hit("t-1", "yt-abc123"),
            snippet_hit("t-2", "yt-abc123"),
        ])
        .with_video("yt-abc123", parent_video()),
    );
    let router = router(classifier, embedder, store.clone());

    let envelope = router
        .search(&SearchRequest {
            query: "earthquake stories".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(envelope.metadata.level, "snippet");
    assert!(envelope.metadata.warnings.is_empty());
    for result in &envelope.results {
        assert!(result["videoData"]["transcriptJson"].is_array());
        assert!(result["videoData"]["englishTranscriptJson"].is_array());
    }
    // one parent lookup per returned snippet
    assert_eq!(store.get_calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_parent_degrades_only_that_result() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Snippet));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(
        MockStore::new(vec![
            snippet_hit("t-1", "yt-abc123"),
            snippet_hit("t-2", "yt-gone"),
        ])
        .with_video("yt-abc123", parent_video()),
    );
    let router = router(classifier, embedder, store);

    let envelope = router
        .search(&SearchRequest {
            query: "earthquake stories".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(envelope.results[0]["videoData"]["transcriptJson"].is_array());
    assert!(envelope.results[1]["videoData"].is_null());
    assert_eq!(envelope.metadata.warnings.len(), 1);
    assert!(envelope.metadata.warnings[0].contains("yt-gone"));
}

#[tokio::test]
async fn failed_parent_lookup_degrades_instead_of_failing() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Snippet));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(
        MockStore::new(vec![
            snippet_hit("t-1", "yt-abc123"),
            snippet_hit("t-2", "yt-broken"),
        ])
        .with_video("yt-abc123", parent_video())
        .failing_get_for("yt-broken"),
    );
    let router = router(classifier, embedder, store);

    let envelope = router
        .search(&SearchRequest {
            query: "earthquake stories".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(envelope.results[0]["videoData"].is_object());
    assert!(envelope.results[1]["videoData"].is_null());
    assert_eq!(envelope.metadata.warnings.len(), 1);
}

// ── Pagination ────────────────────────────────────────────────────────

#[tokio::test]
async fn pagination_metadata_reflects_from_and_size() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![video_hit("A"), video_hit("B")]));
    let router = router(classifier, embedder, store);

    let envelope = router
        .search(&SearchRequest {
            query: "temple".into(),
            from: 20,
            size: 10,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(envelope.metadata.page, 3);
    assert_eq!(envelope.metadata.page_size, 10);
    // count of items actually returned, not the engine's matching total
    assert_eq!(envelope.metadata.total_results, 2);
}

// ── Filter merging ────────────────────────────────────────────────────

#[tokio::test]
async fn request_filters_override_classifier_inferred_filters() {
    let classifier = Arc::new(
        FixedClassifier::new(SearchType::Keyword, Level::Video).with_filters(RawFilters {
            upload_date: Some("2020-01-01".into()),
            location: Some("Pokhara".into()),
            ..Default::default()
        }),
    );
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![]));
    let router = router(classifier, embedder, store.clone());

    router
        .search(&SearchRequest {
            query: "temple".into(),
            filters: RawFilters {
                upload_date: Some("2023-04-14".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap();

    let (_, body) = store.last_search_body().unwrap();
    let filters = body["query"]["bool"]["filter"].as_array().unwrap();
    assert!(filters.contains(&json!({ "term": { "uploadDate": "2023-04-14" } })));
    // inferred location survives where the request was silent
    assert!(filters.contains(&json!({ "match": { "location": "Pokhara" } })));
}

#[tokio::test]
async fn date_filter_is_dropped_at_snippet_level() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Snippet));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![]));
    let router = router(classifier, embedder, store.clone());

    router
        .search(&SearchRequest {
            query: "earthquake".into(),
            filters: RawFilters {
                upload_date: Some("2023-04-14".into()),
                vid_id: Some("yt-abc123".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap();

    let (collection, body) = store.last_search_body().unwrap();
    assert_eq!(collection, Collection::Snippets);
    let filters = body["query"]["bool"]["filter"].as_array().unwrap();
    assert_eq!(filters, &vec![json!({ "term": { "vidID": "yt-abc123" } })]);
}

// ── Failure propagation ───────────────────────────────────────────────

#[tokio::test]
async fn classifier_failure_aborts_the_request() {
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![]));
    let router = SearchRouter::new(Arc::new(FailingClassifier), embedder, store.clone());

    let err = router
        .search(&SearchRequest {
            query: "temple".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::QueryAnalysis(_)));
    assert_eq!(store.search_call_count(), 0);
}

#[tokio::test]
async fn embedding_failure_never_degrades_to_keyword_search() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Semantic, Level::Video));
    let store = Arc::new(MockStore::new(vec![]));
    let router = SearchRouter::new(classifier, Arc::new(FailingEmbedder), store.clone());

    let err = router
        .search(&SearchRequest {
            query: "stories about the old city".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Embedding(_)));
    // the request aborted, no silent keyword fallback
    assert_eq!(store.search_call_count(), 0);
}

#[tokio::test]
async fn backend_fault_propagates_unmodified() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![]).failing_search());
    let router = router(classifier, embedder, store);

    let err = router
        .search(&SearchRequest {
            query: "temple".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Backend(_)));
}

// ── Direct strategy entrypoints ───────────────────────────────────────

#[tokio::test]
async fn direct_keyword_search_returns_raw_ranked_list() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Semantic, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![video_hit("Pashupatinath Temple Visit")]));
    let router = router(classifier.clone(), embedder, store);

    let results = router
        .keyword_search("pashupatinath temple", Level::Video, &RawFilters::default(), 0, 10)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["vidTitle"], "Pashupatinath Temple Visit");
    assert!(results[0]["score"].is_number());
    // direct entrypoints bypass classification entirely
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn direct_semantic_search_embeds_and_dispatches() {
    let classifier = Arc::new(FixedClassifier::new(SearchType::Keyword, Level::Video));
    let embedder = Arc::new(MockEmbedder::new());
    let store = Arc::new(MockStore::new(vec![]));
    let router = router(classifier, embedder.clone(), store.clone());

    router
        .semantic_search("stories of migration", Level::Snippet, &RawFilters::default(), 0, 10)
        .await
        .unwrap();

    assert_eq!(embedder.call_count(), 1);
    let (collection, body) = store.last_search_body().unwrap();
    assert_eq!(collection, Collection::Snippets);
    assert!(body["query"]["script_score"]["script"]["source"]
        .as_str()
        .unwrap()
        .contains("'snippetEmbedding'"));
}
