//! Reply resolution strategies
//!
//! A resolver turns one user turn into reply text. `DirectResolver` talks to
//! a chat-completions API with a bearer key; `ProxyResolver` goes through a
//! backend that exposes chat, search and weather endpoints.

pub mod direct;
pub mod proxy;
pub mod web_query;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::state::ChatMessage;

pub use direct::DirectResolver;
pub use proxy::ProxyResolver;

/// Sampling temperature sent with every chat request
pub const TEMPERATURE: f32 = 0.6;

#[derive(Debug, Clone)]
pub struct ReplyRequest {
    /// The new user turn
    pub text: String,
    /// Prior turns, oldest first, at most [`crate::history::MAX_CONTEXT`]
    pub context: Vec<ChatMessage>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Remote(String),
    /// Nothing to call (no key, no proxy base); use the local fallback
    Offline,
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("{endpoint} error: {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("{endpoint} returned no content")]
    EmptyContent { endpoint: &'static str },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait ReplyResolver: Send + Sync {
    async fn resolve(&self, request: &ReplyRequest) -> Result<Reply, ReplyError>;

    /// Short name for logs and the status line
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// System instruction, then context with `ai` mapped to `assistant`, then
/// the new user turn
pub fn build_messages(system_prompt: &str, request: &ReplyRequest) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(request.context.len() + 2);
    messages.push(WireMessage {
        role: "system".to_string(),
        content: system_prompt.to_string(),
    });
    for message in &request.context {
        messages.push(WireMessage {
            role: message.role.api_name().to_string(),
            content: message.content.clone(),
        });
    }
    messages.push(WireMessage {
        role: "user".to_string(),
        content: request.text.clone(),
    });
    messages
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
}
