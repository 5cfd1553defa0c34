pub mod client;
pub mod config;
pub mod insights;
pub mod logging;
pub mod pipeline;
pub mod survey;
pub mod validate;

pub use client::NewsApiClient;
pub use config::{NewsConfig, PipelineConfig, ProbeConfig};
pub use insights::DashboardStats;
pub use pipeline::{FetchMode, FetchOutput, NewsPipeline};
pub use survey::{AnswerOutcome, SurveySession};

pub mod prelude {
    pub use super::{FetchMode, FetchOutput, NewsPipeline, PipelineConfig};
    pub use ain_core::{ClassifiedNewsItem, DisplayNewsItem, Error, Result};
}
