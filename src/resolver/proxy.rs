use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::web_query::{is_weather_query, is_web_query, strip_search_prefix};
use super::{build_messages, ChatRequestBody, Reply, ReplyError, ReplyRequest, ReplyResolver, TEMPERATURE};

#[derive(Serialize)]
struct WeatherRequest<'a> {
    q: &'a str,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    model: &'a str,
}

#[derive(Deserialize, Default)]
struct ContentResponse {
    #[serde(default)]
    content: Option<String>,
}

impl ContentResponse {
    fn into_content(self) -> String {
        self.content.map(|c| c.trim().to_string()).unwrap_or_default()
    }
}

/// Resolves replies through a backend exposing `/chatProxy`,
/// `/searchAnswer` and `/weatherNow`.
///
/// Time-sensitive questions try weather (when it looks like a weather
/// question) and then search before the general chat endpoint. Without a
/// base URL every turn is answered locally.
#[derive(Clone)]
pub struct ProxyResolver {
    client: Client,
    base: Option<String>,
    system_prompt: String,
}

impl ProxyResolver {
    pub fn new(base: Option<&str>, system_prompt: &str) -> Self {
        Self {
            client: Client::new(),
            base: base
                .map(|b| b.trim().trim_end_matches('/').to_string())
                .filter(|b| !b.is_empty()),
            system_prompt: system_prompt.to_string(),
        }
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    async fn weather(&self, base: &str, text: &str) -> Result<Option<String>, ReplyError> {
        let response = self
            .client
            .post(format!("{}/weatherNow", base))
            .json(&WeatherRequest { q: text })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "weather endpoint failed, trying search");
            return Ok(None);
        }

        let content = response.json::<ContentResponse>().await?.into_content();
        Ok(Some(content).filter(|c| !c.is_empty()))
    }

    async fn search(&self, base: &str, request: &ReplyRequest) -> Result<Option<String>, ReplyError> {
        let query = strip_search_prefix(&request.text);
        let response = self
            .client
            .post(format!("{}/searchAnswer", base))
            .json(&SearchRequest {
                q: &query,
                model: &request.model,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReplyError::Status {
                endpoint: "search",
                status: response.status(),
            });
        }

        let content = response.json::<ContentResponse>().await?.into_content();
        Ok(Some(content).filter(|c| !c.is_empty()))
    }

    async fn chat(&self, base: &str, request: &ReplyRequest) -> Result<String, ReplyError> {
        let body = ChatRequestBody {
            model: &request.model,
            messages: build_messages(&self.system_prompt, request),
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chatProxy", base))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReplyError::Status {
                endpoint: "proxy",
                status: response.status(),
            });
        }

        let content = response.json::<ContentResponse>().await?.into_content();
        if content.is_empty() {
            return Err(ReplyError::EmptyContent { endpoint: "proxy" });
        }
        Ok(content)
    }
}

#[async_trait]
impl ReplyResolver for ProxyResolver {
    async fn resolve(&self, request: &ReplyRequest) -> Result<Reply, ReplyError> {
        let Some(base) = self.base.as_deref() else {
            info!("no proxy base configured, using local reply");
            return Ok(Reply::Offline);
        };

        if is_web_query(&request.text) {
            if is_weather_query(&request.text) {
                debug!("routing to weather endpoint");
                if let Some(content) = self.weather(base, &request.text).await? {
                    return Ok(Reply::Remote(content));
                }
            }

            debug!("routing to search endpoint");
            if let Some(content) = self.search(base, request).await? {
                return Ok(Reply::Remote(content));
            }
            debug!("search had no answer, falling back to chat");
        }

        self.chat(base, request).await.map(Reply::Remote)
    }

    fn name(&self) -> &'static str {
        "proxy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_normalization() {
        assert_eq!(
            ProxyResolver::new(Some(" https://fn.example.com/api/ "), "s").base(),
            Some("https://fn.example.com/api")
        );
        assert_eq!(ProxyResolver::new(Some("   "), "s").base(), None);
        assert_eq!(ProxyResolver::new(None, "s").base(), None);
    }

    #[tokio::test]
    async fn test_no_base_is_offline() {
        let resolver = ProxyResolver::new(None, "s");
        let request = ReplyRequest {
            text: "weather today".to_string(),
            context: Vec::new(),
            model: "gpt-4o-mini".to_string(),
        };
        assert_eq!(resolver.resolve(&request).await.unwrap(), Reply::Offline);
    }
}
