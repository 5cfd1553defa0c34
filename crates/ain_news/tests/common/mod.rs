#![allow(dead_code)]

use ain_core::{
    ApiErrorKind, Error, InferenceModel, ManualClock, NewsSource, Result, RetryPolicy,
};
use ain_news::{NewsPipeline, PipelineConfig};
use ain_storage::{Cache, MemoryStore};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays queued envelopes; repeats the last one once the queue runs dry.
pub struct MockSource {
    responses: Mutex<VecDeque<Result<Value>>>,
    last: Mutex<Option<Value>>,
    pub calls: Mutex<u32>,
    pub delay: Option<Duration>,
    pub online: bool,
    pub has_key: bool,
}

impl MockSource {
    pub fn new(responses: Vec<Result<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: Mutex::new(0),
            delay: None,
            online: true,
            has_key: true,
        }
    }

    pub fn ok(articles: Value) -> Self {
        Self::new(vec![Ok(envelope(articles))])
    }

    pub fn failing(kind: ApiErrorKind) -> Self {
        Self::new((0..10).map(|_| Err(Error::api(kind, "upstream failure"))).collect())
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl NewsSource for MockSource {
    fn name(&self) -> &str {
        "MockNews"
    }

    fn validate_credentials(&self) -> Result<()> {
        if self.has_key {
            Ok(())
        } else {
            Err(Error::validation_field("NewsAPI API key is missing or invalid", "NewsAPI"))
        }
    }

    async fn search(&self) -> Result<Value> {
        *self.calls.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(value)) => {
                *self.last.lock().unwrap() = Some(value.clone());
                Ok(value)
            }
            Some(Err(err)) => Err(err),
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| Error::api(ApiErrorKind::Unknown, "no scripted response")),
        }
    }

    async fn check_connectivity(&self) -> bool {
        self.online
    }
}

type Responder = Box<dyn Fn(&str) -> Result<Value> + Send + Sync>;

/// Answers prompts through a closure and records every prompt it sees.
pub struct MockModel {
    respond: Responder,
    pub prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new(respond: impl Fn(&str) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(|_| Err(Error::api(ApiErrorKind::RateLimit, "RESOURCE_EXHAUSTED")))
    }

    pub fn prompts_matching(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }

    pub fn enhancement_calls(&self) -> usize {
        self.prompts_matching("generate a comprehensive 2-3 sentence description")
    }
}

#[async_trait]
impl InferenceModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn invoke(&self, prompt: &str) -> Result<Value> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(prompt)
    }
}

/// Accepts prompts and never answers.
#[derive(Default)]
pub struct StalledModel {
    pub calls: Mutex<u32>,
}

#[async_trait]
impl InferenceModel for StalledModel {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn invoke(&self, _prompt: &str) -> Result<Value> {
        *self.calls.lock().unwrap() += 1;
        std::future::pending().await
    }
}

pub fn envelope(articles: Value) -> Value {
    json!({ "status": "ok", "totalResults": 2, "articles": articles })
}

pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        news_retry: RetryPolicy::immediate(3),
        model_retry: RetryPolicy::immediate(2),
        ..PipelineConfig::default()
    }
}

pub struct Harness {
    pub pipeline: NewsPipeline,
    pub source: Arc<MockSource>,
    pub model: Arc<MockModel>,
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
}

pub fn harness_with(source: MockSource, model: MockModel, config: PipelineConfig) -> Harness {
    let source = Arc::new(source);
    let model = Arc::new(model);
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let cache = Cache::new(Arc::new(store.clone())).with_clock(clock.clone());
    let pipeline = NewsPipeline::new(source.clone(), model.clone(), cache, config)
        .with_clock(clock.clone());
    Harness {
        pipeline,
        source,
        model,
        store,
        clock,
    }
}

pub fn harness(source: MockSource, model: MockModel) -> Harness {
    harness_with(source, model, test_config())
}
