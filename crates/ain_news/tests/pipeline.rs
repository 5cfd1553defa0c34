mod common;

use ain_core::{
    ApiErrorKind, ClassifiedNewsItem, Clock, Error, Impact, KeyValueStore, Status, DISPLAY_CACHE_KEY,
    SURVEY_CACHE_KEY,
};
use ain_core::RetryPolicy;
use ain_inference::enhance::fallback_description;
use ain_news::{FetchMode, FetchOutput, NewsPipeline, PipelineConfig};
use ain_storage::{Cache, MemoryStore};
use anyhow::Result;
use common::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const HOSPITAL: &str = "Hospital AI assistant rolls out";
const CLASSROOM: &str = "Chatbots arrive in classrooms";

fn long_text() -> String {
    let text = "Educators across the district report that school pupils now draft essays with \
                chatbot help, while administrators weigh guidance on assignments, grading and \
                assessment integrity for the coming term and beyond that as well.";
    assert!(text.chars().count() >= 200);
    text.to_string()
}

/// End to end: one short description goes through enhancement, one long one
/// does not; the model answers JSON for the first article and prose for the
/// second.
#[tokio::test]
async fn test_fetch_classify_and_cache() -> Result<()> {
    let articles = json!([
        { "title": HOSPITAL, "description": "Short text" },
        { "title": CLASSROOM, "description": long_text() }
    ]);
    let model = MockModel::new(|prompt| {
        if prompt.contains("generate a comprehensive 2-3 sentence description") {
            Ok(json!("The assistant triages patients and raises questions about oversight."))
        } else if prompt.contains(HOSPITAL) {
            Ok(json!({"content": "{\"impact\":\"negative\",\"category\":\"Ethics\",\"accuracy\":88,\"sources\":12}"}))
        } else {
            Ok(json!("This looks broadly positive to me!"))
        }
    });
    let h = harness(MockSource::ok(articles), model);

    let items = h.pipeline.fetch_survey().await?;
    assert_eq!(items.len(), 2);

    assert_eq!(items[0].id, 1);
    assert_eq!(
        items[0].description,
        "The assistant triages patients and raises questions about oversight."
    );
    assert_eq!(items[0].impact, Impact::Negative);
    assert_eq!(items[0].category, "Ethics");
    assert_eq!(items[0].accuracy, 88);
    assert_eq!(items[0].sources, 12);

    assert_eq!(items[1].id, 2);
    assert_eq!(items[1].description, long_text());
    assert_eq!(items[1].category, "Education");
    assert_eq!(items[1].impact, Impact::Positive);
    assert!((70..85).contains(&items[1].accuracy));
    assert!((3..18).contains(&items[1].sources));

    assert_eq!(h.model.enhancement_calls(), 1);
    // Malformed replies are retried once before falling back.
    assert_eq!(h.model.prompts_matching(CLASSROOM), 2);

    let cached: Option<Vec<ClassifiedNewsItem>> = h.pipeline.cache().get(SURVEY_CACHE_KEY).await;
    assert_eq!(cached.as_ref(), Some(&items));
    Ok(())
}

#[tokio::test]
async fn test_cache_hit_skips_network() -> Result<()> {
    let h = harness(
        MockSource::ok(json!([{ "title": "AI news", "description": long_text() }])),
        MockModel::unavailable(),
    );
    let first = h.pipeline.fetch(FetchMode::Survey).await?;
    let model_calls = h.model.prompts.lock().unwrap().len();

    h.clock.advance(chrono::Duration::minutes(29));
    let second = h.pipeline.fetch(FetchMode::Survey).await?;

    assert_eq!(first, second);
    assert_eq!(h.source.calls(), 1);
    assert_eq!(h.model.prompts.lock().unwrap().len(), model_calls);
    Ok(())
}

#[tokio::test]
async fn test_expired_cache_refetches() -> Result<()> {
    let h = harness(
        MockSource::ok(json!([{ "title": "AI news", "description": long_text() }])),
        MockModel::unavailable(),
    );
    h.pipeline.fetch(FetchMode::Survey).await?;
    h.clock.advance(chrono::Duration::minutes(30));
    h.pipeline.fetch(FetchMode::Survey).await?;
    assert_eq!(h.source.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_malformed_articles_keep_their_slot() -> Result<()> {
    let h = harness(
        MockSource::ok(json!([
            { "title": "Good", "description": long_text() },
            { "description": "A story that arrived without any title at all, sadly." },
            null
        ])),
        MockModel::unavailable(),
    );
    let items = h.pipeline.fetch_survey().await?;
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["Good", "Untitled Article", "Untitled Article"]);
    let ids: Vec<u32> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, [1, 2, 3]);
    // Only the null record is enhanced, and the unavailable model sees both attempts.
    assert_eq!(h.model.enhancement_calls(), 2);
    assert_eq!(h.model.prompts_matching("title: \"Untitled\" and"), 2);
    assert!(items[2].description.starts_with("AI technology development. This advancement"));
    Ok(())
}

#[tokio::test]
async fn test_enhancement_threshold() -> Result<()> {
    let h = harness(
        MockSource::ok(json!([
            { "title": "Exactly fifty", "description": "x".repeat(50) },
            { "title": "Forty nine", "description": "y".repeat(49) },
            { "title": "Empty", "description": "" }
        ])),
        MockModel::new(|_| Ok(json!("not json"))),
    );
    let items = h.pipeline.fetch_survey().await?;
    assert_eq!(items[0].description, "x".repeat(50));
    assert_eq!(items[1].description, "not json");
    assert_eq!(items[2].description, "not json");
    assert_eq!(h.model.enhancement_calls(), 2);
    assert_eq!(h.model.prompts_matching("Exactly fifty"), 2);
    Ok(())
}

#[tokio::test]
async fn test_retry_exhaustion_names_cause_and_attempts() {
    let h = harness(
        MockSource::failing(ApiErrorKind::ServiceUnavailable),
        MockModel::unavailable(),
    );
    let err = h.pipeline.fetch(FetchMode::Survey).await.unwrap_err();
    match &err {
        Error::RetryExhausted { attempts, context, source } => {
            assert_eq!(*attempts, 3);
            assert_eq!(context, "Latest AI Impact News Fetch");
            assert!(source.to_string().contains("upstream failure"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind_tag(), "service-unavailable");
    assert_eq!(h.source.calls(), 3);
    assert!(h.store.get_item(SURVEY_CACHE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_error_envelope_is_not_retried() {
    let source = MockSource::new(vec![Ok(json!({
        "status": "error",
        "code": "rateLimited",
        "message": "Too many requests"
    }))]);
    let h = harness(source, MockModel::unavailable());
    let err = h.pipeline.fetch(FetchMode::Display).await.unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(h.source.calls(), 1);
}

#[tokio::test]
async fn test_missing_key_fails_before_network() {
    let mut source = MockSource::ok(json!([]));
    source.has_key = false;
    let h = harness(source, MockModel::unavailable());
    let err = h.pipeline.fetch(FetchMode::Survey).await.unwrap_err();
    assert_eq!(err.kind_tag(), "validation");
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn test_empty_batch_is_rejected_and_not_cached() {
    let h = harness(MockSource::ok(json!([])), MockModel::unavailable());
    let err = h.pipeline.fetch(FetchMode::Survey).await.unwrap_err();
    assert_eq!(err.api_kind(), Some(ApiErrorKind::Classification));
    assert_eq!(h.source.calls(), 1);
    assert!(h.pipeline.cache_status().await.survey.is_none());
}

#[tokio::test]
async fn test_probe_is_a_hint_unless_required() -> Result<()> {
    let mut source = MockSource::ok(json!([{ "title": "AI", "description": long_text() }]));
    source.online = false;
    let h = harness(source, MockModel::unavailable());
    assert_eq!(h.pipeline.fetch(FetchMode::Survey).await?.len(), 1);

    let mut source = MockSource::ok(json!([{ "title": "AI", "description": long_text() }]));
    source.online = false;
    let h = harness_with(
        source,
        MockModel::unavailable(),
        PipelineConfig {
            probe_required: true,
            ..test_config()
        },
    );
    let err = h.pipeline.fetch(FetchMode::Survey).await.unwrap_err();
    assert_eq!(err.api_kind(), Some(ApiErrorKind::Connectivity));
    assert_eq!(h.source.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_deadline_leaves_cache_empty() {
    let mut source = MockSource::ok(json!([{ "title": "AI", "description": long_text() }]));
    source.delay = Some(Duration::from_millis(500));
    let h = harness(source, MockModel::unavailable());

    let err = h
        .pipeline
        .fetch_with_deadline(FetchMode::Survey, Duration::from_millis(20))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DeadlineExceeded(_)));

    // Give an abandoned request time to finish if it were still running.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(h.store.get_item(SURVEY_CACHE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_shutdown_signal_cancels_fetch() {
    let mut source = MockSource::ok(json!([{ "title": "AI", "description": long_text() }]));
    source.delay = Some(Duration::from_secs(5));
    let h = harness(source, MockModel::unavailable());

    let (tx, rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = tx.send(true);
    });
    let err = h.pipeline.fetch_until(FetchMode::Survey, rx).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(h.pipeline.cache_status().await.survey.is_none());

    let (_tx, rx) = tokio::sync::watch::channel(true);
    assert!(matches!(
        h.pipeline.fetch_until(FetchMode::Survey, rx).await,
        Err(Error::Cancelled)
    ));
}

fn stalled_pipeline(
    config: PipelineConfig,
    articles: serde_json::Value,
) -> (NewsPipeline, MemoryStore, Arc<StalledModel>) {
    let model = Arc::new(StalledModel::default());
    let store = MemoryStore::new();
    let pipeline = NewsPipeline::new(
        Arc::new(MockSource::ok(articles)),
        model.clone(),
        Cache::new(Arc::new(store.clone())),
        config,
    );
    (pipeline, store, model)
}

#[tokio::test(start_paused = true)]
async fn test_stalled_model_falls_back_within_default_deadline() -> Result<()> {
    let config = PipelineConfig {
        news_retry: RetryPolicy::immediate(1),
        ..PipelineConfig::default()
    };
    let deadline = config.deadline;
    let (pipeline, store, model) = stalled_pipeline(
        config,
        json!([
            { "title": "Short one", "description": "Too short" },
            { "title": CLASSROOM, "description": long_text() }
        ]),
    );

    let started = Instant::now();
    let items = match pipeline.fetch_with_deadline(FetchMode::Survey, deadline).await? {
        FetchOutput::Survey(items) => items,
        other => panic!("unexpected output: {other:?}"),
    };
    assert!(started.elapsed() < deadline);

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].description, fallback_description("Too short"));
    assert_eq!(items[1].description, long_text());
    assert_eq!(items[1].category, "Education");
    assert!(*model.calls.lock().unwrap() >= 2);
    assert!(store.get_item(SURVEY_CACHE_KEY).await?.is_some());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_article_budget_is_capped_by_deadline() -> Result<()> {
    let config = PipelineConfig {
        news_retry: RetryPolicy::immediate(1),
        deadline: Duration::from_secs(4),
        article_budget: Duration::from_secs(120),
        ..PipelineConfig::default()
    };
    let (pipeline, store, _model) = stalled_pipeline(
        config,
        json!([{ "title": "Breaking: chip export rules", "description": "" }]),
    );

    let started = Instant::now();
    let items = pipeline.fetch_until(FetchMode::Display, tokio::sync::watch::channel(false).1).await?;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
    match items {
        FetchOutput::Display(items) => {
            assert_eq!(items[0].status, Status::Urgent);
            assert!(items[0].excerpt.starts_with("AI technology development."));
        }
        other => panic!("unexpected output: {other:?}"),
    }
    assert!(store.get_item(DISPLAY_CACHE_KEY).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_display_mode() -> Result<()> {
    let h = harness(
        MockSource::ok(json!([
            {
                "title": "Breaking: critical flaw found",
                "description": long_text(),
                "author": "Jordan Lee",
                "publishedAt": "2024-05-01T10:00:00Z"
            },
            { "title": "Model release", "description": long_text() }
        ])),
        MockModel::new(|prompt| {
            if prompt.contains("Model release") {
                Ok(json!("{\"category\":\"Research\",\"status\":\"featured\"}"))
            } else {
                Ok(json!("no idea"))
            }
        }),
    );

    let items = h.pipeline.fetch_display().await?;
    assert_eq!(items[0].author, "Jordan Lee");
    assert_eq!(items[0].published_at, "2024-05-01T10:00:00Z");
    assert_eq!(items[0].status, Status::Urgent);
    assert_eq!(items[0].category, "Education");
    assert_eq!(items[1].author, "AI News");
    assert_eq!(items[1].published_at, h.clock.now().to_rfc3339());
    assert_eq!(items[1].category, "Research");
    assert_eq!(items[1].status, Status::Featured);
    for item in &items {
        assert_eq!(item.read_time, "3 min read");
        assert!((100..400).contains(&item.views));
    }

    let status = h.pipeline.cache_status().await;
    assert_eq!(status.display.map(|i| i.item_count), Some(2));
    assert!(status.survey.is_none());
    Ok(())
}

#[tokio::test]
async fn test_refresh_and_clear() -> Result<()> {
    let h = harness(
        MockSource::ok(json!([{ "title": "AI", "description": long_text() }])),
        MockModel::unavailable(),
    );
    h.pipeline.fetch(FetchMode::Survey).await?;
    h.pipeline.fetch(FetchMode::Display).await?;
    assert_eq!(h.source.calls(), 2);

    let refreshed = h.pipeline.refresh(FetchMode::Survey).await?;
    assert!(matches!(refreshed, FetchOutput::Survey(ref items) if items.len() == 1));
    assert_eq!(h.source.calls(), 3);

    h.pipeline.clear_cache(Some(ain_core::CacheSlot::Display)).await;
    assert!(h.store.get_item(DISPLAY_CACHE_KEY).await?.is_none());
    assert!(h.store.get_item(SURVEY_CACHE_KEY).await?.is_some());

    h.pipeline.clear_cache(None).await;
    let status = h.pipeline.cache_status().await;
    assert!(status.survey.is_none() && status.display.is_none());
    Ok(())
}
