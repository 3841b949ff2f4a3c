// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grade/subject/semester classification through an OpenAI-compatible
//! chat-completions endpoint.

use std::time::Duration;

use bookmill_config::model::ExtractionConfig;
use bookmill_core::{BookmillError, Classification};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are an assistant that extracts educational book metadata. \
Based on the book content, identify the following information:
1. Grade level (as a number between 1-12)
2. Subject (e.g., Math, Science, History, etc.)
3. Semester (1 or 2, if applicable)

Return a JSON object with these fields. If you cannot determine a field, use null.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
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
    message: ChatMessage,
}

/// Client for the classification endpoint.
#[derive(Debug, Clone)]
pub struct LlmClassifier {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_prompt_chars: usize,
}

impl LlmClassifier {
    /// Builds a classifier from config, or `None` when no API key is set.
    pub fn from_config(config: &ExtractionConfig) -> Result<Option<Self>, BookmillError> {
        match config.api_key.as_deref() {
            Some(key) => Self::new(key, config).map(Some),
            None => Ok(None),
        }
    }

    pub fn new(api_key: &str, config: &ExtractionConfig) -> Result<Self, BookmillError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| BookmillError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BookmillError::Dependency {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            model: config.model.clone(),
            max_prompt_chars: config.max_prompt_chars,
        })
    }

    /// Asks the model to classify a sample of the book's text.
    pub async fn classify(&self, text: &str) -> Result<Classification, BookmillError> {
        let sample: String = text.chars().take(self.max_prompt_chars).collect();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Analyze this educational book content to extract metadata: {sample}"
                    ),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| BookmillError::Dependency {
                message: format!("classification request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "classification response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BookmillError::dependency(format!(
                "classification endpoint returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| BookmillError::Dependency {
            message: format!("malformed classification response: {e}"),
            source: Some(Box::new(e)),
        })?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_else(|| "{}".to_string());

        parse_classification(&content)
    }
}

/// Reads the model's JSON answer, dropping anything out of range.
pub fn parse_classification(content: &str) -> Result<Classification, BookmillError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| BookmillError::Dependency {
            message: format!("classification is not valid JSON: {e}"),
            source: Some(Box::new(e)),
        })?;

    let number_in = |key: &str, max: u64| {
        value
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .filter(|n| (1..=max).contains(n))
            .map(|n| n as u8)
    };

    Ok(Classification {
        grade: number_in("grade", 12),
        subject: value
            .get("subject")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        semester: number_in("semester", 2),
    })
}
