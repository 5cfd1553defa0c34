use ain_core::{CacheSlot, InferenceModel};
use ain_inference::models::{create_model, OfflineModel};
use ain_news::config::NEWSAPI_BASE_URL;
use ain_news::logging::{init_logging, Logger};
use ain_news::{
    DashboardStats, FetchMode, FetchOutput, NewsApiClient, NewsConfig, NewsPipeline,
    PipelineConfig, ProbeConfig,
};
use ain_storage::{Cache, ResultsStore};
use ain_web::{create_app, AppState};
use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

mod duration;
mod output;
mod survey;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(name = "ain", author, version, about = "Fetch, classify and explore AI impact news", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or file
    #[arg(long, env = "AIN_STORAGE", default_value = "file")]
    storage: String,
    #[arg(long, env = "AIN_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    news_api_key: Option<String>,
    #[arg(long, env = "NEWSAPI_BASE_URL", default_value = NEWSAPI_BASE_URL)]
    news_base_url: String,
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,
    #[arg(
        long,
        env = "AIN_MODEL",
        default_value = "gemini",
        value_parser = ["gemini", "offline"],
        help = "Model used for enhancement and classification. Available models: gemini (default), offline"
    )]
    model: String,
    /// Override the Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL")]
    model_url: Option<String>,
    /// Give up on a fetch after this long (e.g. 30s, 1m)
    #[arg(long, default_value = "30s")]
    deadline: HumanDuration,
    #[arg(long, default_value = "30m")]
    cache_ttl: HumanDuration,
    /// Fail immediately when the connectivity probe fails
    #[arg(long)]
    require_connectivity: bool,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and classify the latest AI news
    News {
        /// Use the display shape (status, author, views) instead of the survey shape
        #[arg(long)]
        display: bool,
        /// Ignore the cache for this fetch
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        json: bool,
    },
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// Play the positive-or-negative survey in the terminal
    Survey,
    /// Dashboard figures from stored results and the current news batch
    Stats {
        #[arg(long)]
        json: bool,
    },
    Results {
        #[command(subcommand)]
        command: ResultsCommands,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    Status,
    /// Clear one slot (survey or display), or both
    Clear { slot: Option<String> },
}

#[derive(Subcommand, Debug)]
enum ResultsCommands {
    /// Delete every stored survey result
    Clear,
}

fn build_model(cli: &Cli, logger: &Logger) -> Arc<dyn InferenceModel> {
    let config = ain_inference::Config {
        provider: cli.model.clone(),
        api_key: cli.google_api_key.clone(),
        base_url: cli.model_url.clone(),
        ..ain_inference::Config::default()
    };
    match create_model(&config) {
        Ok(model) => model,
        Err(err) => {
            logger.warn(&format!("{}; using keyword classification only", err));
            Arc::new(OfflineModel)
        }
    }
}

async fn news_for_stats(
    pipeline: &NewsPipeline,
    shutdown: watch::Receiver<bool>,
    logger: &Logger,
) -> Vec<ain_core::ClassifiedNewsItem> {
    match pipeline.fetch_until(FetchMode::Survey, shutdown).await {
        Ok(FetchOutput::Survey(items)) => items,
        Ok(FetchOutput::Display(_)) => Vec::new(),
        Err(err) => {
            logger.warn(&format!("News unavailable for stats: {}", err));
            Vec::new()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let logger = init_logging(level).with_prefix("[ain]");

    let store = ain_storage::create_store(&cli.storage, Some(cli.data_dir.as_path())).await?;
    info!("💾 Storage ready (using {})", cli.storage);

    let model = build_model(&cli, &logger);
    info!("🧠 Inference model ready (using {})", model.name());

    let source = NewsApiClient::new(
        NewsConfig {
            api_key: cli.news_api_key.clone(),
            base_url: cli.news_base_url.clone(),
            ..NewsConfig::default()
        },
        ProbeConfig::default(),
    )?;
    let config = PipelineConfig {
        probe_required: cli.require_connectivity,
        deadline: cli.deadline.0,
        cache_ttl: chrono::Duration::from_std(cli.cache_ttl.0)?,
        ..PipelineConfig::default()
    };
    let pipeline = Arc::new(NewsPipeline::new(
        Arc::new(source),
        model,
        Cache::new(store.clone()),
        config,
    ));
    let results = ResultsStore::new(store);

    let (shutdown_tx, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    match cli.command {
        Commands::News {
            display,
            refresh,
            json,
        } => {
            let mode = if display { FetchMode::Display } else { FetchMode::Survey };
            if refresh {
                pipeline.clear_cache(Some(mode.slot())).await;
            }
            let news = pipeline.fetch_until(mode, shutdown).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&news)?);
            } else {
                output::print_news(&news);
            }
        }
        Commands::Cache { command } => match command {
            CacheCommands::Status => output::print_cache_status(&pipeline.cache_status().await),
            CacheCommands::Clear { slot } => {
                let slot = match slot.as_deref() {
                    None => None,
                    Some(name) => match CacheSlot::parse(name) {
                        Some(slot) => Some(slot),
                        None => bail!("Unknown cache slot: {}. Expected survey or display", name),
                    },
                };
                pipeline.clear_cache(slot).await;
                info!("🧹 Cache cleared");
            }
        },
        Commands::Survey => {
            let items = match pipeline.fetch_until(FetchMode::Survey, shutdown).await? {
                FetchOutput::Survey(items) => items,
                FetchOutput::Display(_) => Vec::new(),
            };
            survey::run(items, &results).await?;
        }
        Commands::Stats { json } => {
            let news = news_for_stats(&pipeline, shutdown, &logger).await;
            let stats = DashboardStats::compute(
                &results.survey_results().await,
                &results.feed_results().await,
                &news,
                Utc::now(),
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                output::print_stats(&stats);
            }
        }
        Commands::Results { command } => match command {
            ResultsCommands::Clear => {
                results.clear_survey_results().await?;
                info!("🧹 Survey results cleared");
            }
        },
        Commands::Serve { addr } => {
            let app = create_app(AppState { pipeline, results }).await;
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("🌐 Listening on http://{}", addr);
            let mut shutdown = shutdown;
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    while shutdown.changed().await.is_ok() {
                        if *shutdown.borrow() {
                            break;
                        }
                    }
                })
                .await?;
        }
    }

    Ok(())
}
