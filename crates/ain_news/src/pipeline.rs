use ain_core::{
    ApiError, ApiErrorKind, CacheSlot, CacheStatus, ClassifiedNewsItem, Clock, DisplayNewsItem,
    Error, InferenceModel, NewsSource, RawArticle, Result, SystemClock,
};
use ain_inference::enhance::{fallback_description, needs_enhancement};
use ain_inference::{keywords, Classifier, Enhancer};
use ain_storage::Cache;
use futures::future::join_all;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::PipelineConfig;
use crate::logging::Logger;
use crate::validate::validate_envelope;

pub const UNTITLED: &str = "Untitled Article";
/// Title sent to the enhancer for articles without one.
pub const ENHANCE_UNTITLED: &str = "Untitled";
pub const DEFAULT_AUTHOR: &str = "AI News";
pub const READ_TIME: &str = "3 min read";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Survey,
    Display,
}

impl FetchMode {
    pub fn slot(&self) -> CacheSlot {
        match self {
            FetchMode::Survey => CacheSlot::Survey,
            FetchMode::Display => CacheSlot::Display,
        }
    }

    fn context(&self) -> &'static str {
        match self {
            FetchMode::Survey => "Latest AI Impact News Fetch",
            FetchMode::Display => "Latest AI Impact News Display Fetch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FetchOutput {
    Survey(Vec<ClassifiedNewsItem>),
    Display(Vec<DisplayNewsItem>),
}

impl FetchOutput {
    pub fn len(&self) -> usize {
        match self {
            FetchOutput::Survey(items) => items.len(),
            FetchOutput::Display(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetch, validate, enhance, classify and cache AI news.
pub struct NewsPipeline {
    source: Arc<dyn NewsSource>,
    enhancer: Enhancer,
    classifier: Classifier,
    cache: Cache,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
    logger: Logger,
}

impl NewsPipeline {
    pub fn new(
        source: Arc<dyn NewsSource>,
        model: Arc<dyn InferenceModel>,
        cache: Cache,
        config: PipelineConfig,
    ) -> Self {
        let logger = Logger::new().with_prefix(format!("[{}]", source.name()));
        Self {
            enhancer: Enhancer::new(model.clone()).with_retry(config.model_retry.clone()),
            classifier: Classifier::new(model).with_retry(config.model_retry.clone()),
            cache: cache.with_ttl(config.cache_ttl),
            clock: Arc::new(SystemClock),
            source,
            config,
            logger,
        }
    }

    /// Clock used for display timestamps. The cache keeps its own.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn fetch_survey(&self) -> Result<Vec<ClassifiedNewsItem>> {
        let mode = FetchMode::Survey;
        self.source.validate_credentials()?;
        if let Some(items) = self.cached(mode).await {
            return Ok(items);
        }
        let articles = self.load_articles(mode).await?;
        let items =
            join_all(articles.iter().enumerate().map(|(i, a)| self.survey_item(i, a))).await;
        self.store(mode, items).await
    }

    pub async fn fetch_display(&self) -> Result<Vec<DisplayNewsItem>> {
        let mode = FetchMode::Display;
        self.source.validate_credentials()?;
        if let Some(items) = self.cached(mode).await {
            return Ok(items);
        }
        let articles = self.load_articles(mode).await?;
        let items =
            join_all(articles.iter().enumerate().map(|(i, a)| self.display_item(i, a))).await;
        self.store(mode, items).await
    }

    pub async fn fetch(&self, mode: FetchMode) -> Result<FetchOutput> {
        match mode {
            FetchMode::Survey => self.fetch_survey().await.map(FetchOutput::Survey),
            FetchMode::Display => self.fetch_display().await.map(FetchOutput::Display),
        }
    }

    /// Drop the mode's cache slot, then fetch.
    pub async fn refresh(&self, mode: FetchMode) -> Result<FetchOutput> {
        self.clear_cache(Some(mode.slot())).await;
        self.fetch(mode).await
    }

    /// One slot, or both when `slot` is `None`.
    pub async fn clear_cache(&self, slot: Option<CacheSlot>) {
        self.cache.clear(slot.map(|s| s.key())).await;
    }

    pub async fn cache_status(&self) -> CacheStatus {
        CacheStatus {
            survey: self.cache.info(CacheSlot::Survey.key()).await,
            display: self.cache.info(CacheSlot::Display.key()).await,
        }
    }

    /// Abandoning the fetch drops it, which aborts in-flight requests and
    /// skips the cache write.
    pub async fn fetch_with_deadline(&self, mode: FetchMode, deadline: Duration) -> Result<FetchOutput> {
        match tokio::time::timeout(deadline, self.fetch(mode)).await {
            Ok(result) => result,
            Err(_) => {
                self.logger.warn(&format!("Fetch abandoned after {:?}", deadline));
                Err(Error::DeadlineExceeded(deadline))
            }
        }
    }

    /// Fetch under the configured deadline, stopping early once `shutdown`
    /// reads `true`.
    pub async fn fetch_until(
        &self,
        mode: FetchMode,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<FetchOutput> {
        if *shutdown.borrow() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            result = self.fetch_with_deadline(mode, self.config.deadline) => result,
            _ = wait_for_shutdown(&mut shutdown) => {
                self.logger.warn("Fetch cancelled");
                Err(Error::Cancelled)
            }
        }
    }

    async fn cached<T: DeserializeOwned>(&self, mode: FetchMode) -> Option<Vec<T>> {
        let items: Vec<T> = self.cache.get(mode.slot().key()).await?;
        self.logger.info(&format!("Using cached AI news data ({} items)", items.len()));
        Some(items)
    }

    async fn load_articles(&self, mode: FetchMode) -> Result<Vec<RawArticle>> {
        self.probe().await?;
        self.config
            .news_retry
            .run(mode.context(), |_| async move {
                let envelope = self.source.search().await?;
                validate_envelope(&envelope)
            })
            .await
    }

    async fn store<T: Serialize>(&self, mode: FetchMode, items: Vec<T>) -> Result<Vec<T>> {
        if items.is_empty() {
            return Err(ApiError::new(
                ApiErrorKind::Classification,
                "No valid AI impact news articles could be processed",
            )
            .into());
        }
        self.cache.set(mode.slot().key(), &items).await;
        self.logger.info(&format!("Processed and cached {} articles", items.len()));
        Ok(items)
    }

    async fn probe(&self) -> Result<()> {
        if self.source.check_connectivity().await {
            return Ok(());
        }
        if self.config.probe_required {
            return Err(ApiError::new(
                ApiErrorKind::Connectivity,
                "No internet connection detected. Please check your network connection.",
            )
            .into());
        }
        self.logger.warn("Connectivity probe failed, trying the news API anyway");
        Ok(())
    }

    /// Per-article limit on model work, never more than half the fetch deadline.
    fn article_budget(&self) -> Duration {
        self.config.article_budget.min(self.config.deadline / 2)
    }

    async fn text_of(&self, index: usize, article: &RawArticle) -> String {
        let raw = article.raw_text();
        if !needs_enhancement(raw) {
            return raw.to_string();
        }
        self.logger.debug(&format!("Enhancing short description of article {}", index + 1));
        let title = clean_title(article).unwrap_or(ENHANCE_UNTITLED);
        self.enhancer.enhance(title, raw).await
    }

    fn over_budget(&self, index: usize) {
        self.logger.warn(&format!(
            "Language model did not finish article {} within {:?}, using keyword classification",
            index + 1,
            self.article_budget()
        ));
    }

    async fn survey_item(&self, index: usize, article: &RawArticle) -> ClassifiedNewsItem {
        let title = clean_title(article).unwrap_or(UNTITLED).to_string();
        let modelled = tokio::time::timeout(self.article_budget(), async {
            let text = self.text_of(index, article).await;
            let classification = self.classifier.classify_survey(&title, &text).await;
            (text, classification)
        })
        .await;
        let (text, classification) = modelled.unwrap_or_else(|_| {
            self.over_budget(index);
            let text = offline_text(article.raw_text());
            let classification = keywords::classify::<keywords::Survey>(&title, &text);
            (text, classification)
        });
        ClassifiedNewsItem {
            id: index as u32 + 1,
            title,
            description: text,
            impact: classification.impact,
            category: classification.category,
            accuracy: classification.accuracy,
            sources: classification.sources,
        }
    }

    async fn display_item(&self, index: usize, article: &RawArticle) -> DisplayNewsItem {
        let title = clean_title(article).unwrap_or(UNTITLED).to_string();
        let modelled = tokio::time::timeout(self.article_budget(), async {
            let text = self.text_of(index, article).await;
            let classification = self.classifier.classify_display(&title, &text).await;
            (text, classification)
        })
        .await;
        let (text, classification) = modelled.unwrap_or_else(|_| {
            self.over_budget(index);
            let text = offline_text(article.raw_text());
            let classification = keywords::classify::<keywords::Display>(&title, &text);
            (text, classification)
        });
        DisplayNewsItem {
            id: index as u32 + 1,
            title,
            excerpt: text,
            author: article.author.clone().unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            published_at: article
                .published_at
                .clone()
                .unwrap_or_else(|| self.clock.now().to_rfc3339()),
            read_time: READ_TIME.to_string(),
            views: rand::thread_rng().gen_range(100..400),
            category: classification.category,
            status: classification.status,
        }
    }
}

fn clean_title(article: &RawArticle) -> Option<&str> {
    article
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Description used when the model never got to run.
fn offline_text(raw: &str) -> String {
    if needs_enhancement(raw) {
        fallback_description(raw)
    } else {
        raw.to_string()
    }
}

/// Resolves once the flag flips to `true`; never resolves if the sender is
/// dropped first.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        if *shutdown.borrow() {
            return;
        }
    }
}
