//! OpenAI-compatible chat-completions client (Groq by default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reasoner::{Reasoner, ReasonerError};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Connection and sampling settings for [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}

/// Chat-completions client used as the pipeline's [`Reasoner`].
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    pub fn new(mut config: ChatConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Same endpoint and model with a different completion budget.
    pub fn with_max_tokens(&self, max_tokens: u32) -> Self {
        let mut config = self.config.clone();
        config.max_tokens = Some(max_tokens);
        Self {
            client: self.client.clone(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl Reasoner for ChatClient {
    async fn invoke(&self, prompt: &str) -> Result<String, ReasonerError> {
        let url = self.endpoint();
        debug!(
            url = %url,
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "chat completion"
        );

        let mut req = self.client.post(&url).json(&self.request(prompt));
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReasonerError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        completion_text(&body)
    }
}

/// First choice's message content from a chat-completions response body.
fn completion_text(body: &str) -> Result<String, ReasonerError> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(ReasonerError::EmptyResponse)
}
