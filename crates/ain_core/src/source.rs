use async_trait::async_trait;
use serde_json::Value;
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the name of the news provider
    fn name(&self) -> &str;

    /// Rejects missing credentials before anything touches the network
    fn validate_credentials(&self) -> Result<()> {
        Ok(())
    }

    /// Runs one search request and returns the undecoded response envelope
    async fn search(&self) -> Result<Value>;

    /// Best-effort reachability check, used only to tell "offline" apart from
    /// "provider down" in messages
    async fn check_connectivity(&self) -> bool {
        true
    }
}
