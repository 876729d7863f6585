use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::llm::{ChatRequest, CompletionClient, Message};
use crate::prompt;
use crate::table::Table;

/// Prefix of the answer returned when a request fails.
pub const ERROR_PREFIX: &str = "Error processing your question: ";

/// Answers single questions about one table. Holds no conversation history.
pub struct Analyzer<C> {
    client: C,
    table: Table,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl<C: CompletionClient> Analyzer<C> {
    pub fn new(client: C, table: Table, config: &LlmConfig) -> Self {
        Self {
            client,
            table,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Build the system + user request for `question`.
    pub fn request_for(&self, question: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(prompt::render(&self.table)),
                Message::user(question),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Ask one question. Failures come back as an answer string starting
    /// with [`ERROR_PREFIX`].
    pub async fn ask(&self, question: &str) -> String {
        let request = self.request_for(question);
        debug!(
            model = %self.model,
            prompt_len = request.messages[0].content.len(),
            "asking question"
        );

        match self.client.complete(&request).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "question failed");
                format!("{}{}", ERROR_PREFIX, e)
            }
        }
    }
}
