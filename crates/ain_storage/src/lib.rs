use ain_core::{KeyValueStore, Result};
use std::path::Path;
use std::sync::Arc;

pub mod backends;
pub mod cache;
pub mod results;

pub use backends::*;
pub use cache::Cache;
pub use results::ResultsStore;

/// Build a store by backend name: `memory`, or `file` rooted at `data_dir`.
pub async fn create_store(kind: &str, data_dir: Option<&Path>) -> Result<Arc<dyn KeyValueStore>> {
    match kind.to_ascii_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "file" => {
            let dir = data_dir.unwrap_or_else(|| Path::new("./data"));
            Ok(Arc::new(FileStore::new(dir).await?))
        }
        other => Err(ain_core::Error::Storage(format!(
            "Unknown storage backend: {}. Available backends: memory, file",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{Cache, ResultsStore};
}
