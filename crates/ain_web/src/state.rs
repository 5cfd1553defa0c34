use ain_news::NewsPipeline;
use ain_storage::ResultsStore;
use std::sync::Arc;

pub struct AppState {
    pub pipeline: Arc<NewsPipeline>,
    pub results: ResultsStore,
}
