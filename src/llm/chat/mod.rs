pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use super::{ LlmConfig, LlmError };
use crate::models::chat::ChatMessage;
use self::openai::OpenAIChatClient;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the whole message history and returns the assistant's reply text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32
    ) -> Result<String, LlmError>;

    fn get_model(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    // Every supported provider speaks the same chat-completions dialect.
    let client: Arc<dyn ChatClient> = Arc::new(OpenAIChatClient::from_config(config)?);
    Ok(client)
}
