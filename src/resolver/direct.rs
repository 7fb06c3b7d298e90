use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{build_messages, ChatRequestBody, Reply, ReplyError, ReplyRequest, ReplyResolver, TEMPERATURE};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

/// Calls a chat-completions API directly with a bearer key
#[derive(Clone)]
pub struct DirectResolver {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    system_prompt: String,
}

impl DirectResolver {
    pub fn new(api_base: &str, api_key: Option<String>, system_prompt: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            system_prompt: system_prompt.to_string(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ReplyResolver for DirectResolver {
    async fn resolve(&self, request: &ReplyRequest) -> Result<Reply, ReplyError> {
        let Some(api_key) = &self.api_key else {
            info!("no api key configured, using local reply");
            return Ok(Reply::Offline);
        };

        let body = ChatRequestBody {
            model: &request.model,
            messages: build_messages(&self.system_prompt, request),
            temperature: TEMPERATURE,
        };
        debug!(model = %request.model, turns = body.messages.len(), "sending completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReplyError::Status {
                endpoint: "api",
                status: response.status(),
            });
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ReplyError::EmptyContent { endpoint: "api" });
        }
        Ok(Reply::Remote(content))
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_offline_without_network() {
        // Unroutable base: any request attempt would fail rather than return Offline
        let resolver = DirectResolver::new("http://127.0.0.1:9", None, "sys");
        let request = ReplyRequest {
            text: "hi".to_string(),
            context: Vec::new(),
            model: "gpt-4o-mini".to_string(),
        };
        assert_eq!(resolver.resolve(&request).await.unwrap(), Reply::Offline);
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let resolver = DirectResolver::new(DEFAULT_API_BASE, Some("  ".to_string()), "sys");
        assert!(!resolver.has_key());
    }
}
