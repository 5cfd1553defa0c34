use async_trait::async_trait;
use serde_json::Value;
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Run a prompt and return the raw model output. Depending on the client
    /// this is a plain string or an object carrying `content` or `text`.
    async fn invoke(&self, prompt: &str) -> Result<Value>;
}
