use crate::analysis::response::{parse_analysis, truncate_body};
use crate::analysis::{AnalysisClient, AnalysisError, SeoAnalysis};
use crate::config::{AnalysisConfig, ApiCredentials};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are an SEO specialist reviewing blog posts. \
Respond with a single JSON object and nothing else. The object must have exactly these keys: \
\"meta_description\" (a compelling meta description of at most 160 characters), \
\"seo_summary\" (two or three sentences on the post's SEO strengths and weaknesses), \
\"keywords\" (an array of 5 to 10 keyword phrases, most relevant first).";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Analysis client for DeepSeek's OpenAI-compatible chat completions API
#[derive(Clone)]
pub struct DeepSeekClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_input_chars: usize,
}

impl DeepSeekClient {
    /// Creates a client from configuration and an explicitly supplied credential
    pub fn new(
        config: &AnalysisConfig,
        credentials: &ApiCredentials,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_key: credentials.api_key().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_input_chars: config.max_input_chars,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, title: &str, body_text: &str) -> ChatRequest<'_> {
        let content = truncate_body(body_text, self.max_input_chars);

        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Title: {}\n\nContent:\n{}", title, content),
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[async_trait]
impl AnalysisClient for DeepSeekClient {
    async fn analyze(&self, title: &str, body_text: &str) -> Result<SeoAnalysis, AnalysisError> {
        let request = self.build_request(title, body_text);

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AnalysisError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(format!("unexpected response shape: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AnalysisError::EmptyResponse)?;

        tracing::debug!(chars = content.len(), "Received analysis response");
        parse_analysis(&content)
    }
}
