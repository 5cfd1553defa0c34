pub mod clock;
pub mod credentials;
pub mod error;
pub mod models;
pub mod retry;
pub mod source;
pub mod storage;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::validate_api_key;
pub use error::{ApiError, ApiErrorKind, Error};
pub use models::InferenceModel;
pub use retry::RetryPolicy;
pub use source::NewsSource;
pub use storage::KeyValueStore;
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{Error, InferenceModel, KeyValueStore, NewsSource, Result};
    pub use super::types::*;
}
