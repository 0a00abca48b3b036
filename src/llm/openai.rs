// ABOUTME: OpenAI chat-completions client for recommendation text generation
// ABOUTME: Fixed Czech nutritionist system instruction, JSON response format, no retry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use super::CompletionProvider;
use crate::config::OpenAiConfig;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature for recommendation generation
const TEMPERATURE: f64 = 0.5;

/// System instruction pinning the model to the nutritionist persona. Czech is
/// the product language; the instruction also demands a bare JSON object with
/// no markdown fencing. This is a prompt-level contract only; the response is
/// stored without validation.
const SYSTEM_INSTRUCTION: &str = "Jsi odborný výživový poradce, který poskytuje personalizovaná doporučení na základě analýzy jídelníčku a profilu uživatele. \
Tvé odpovědi musí být vždy ve formátu čistého JSON objektu bez jakéhokoliv úvodního nebo závěrečného textu. \
Tvé doporučení musí být založeno na vědeckých poznatcích o výživě a fitness. \
Vždy odpovídej v češtině a přizpůsob svá doporučení cílům uživatele (hubnutí, nabírání svalů nebo udržování váhy). \
Tvé odpovědi musí být stručné, jasné a přímo použitelné. \
Nikdy nepřidávej žádné formátování markdown, kódové bloky nebo vysvětlující text - pouze čistý JSON objekt.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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

/// OpenAI-compatible chat-completions client
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client for the configured model
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &OpenAiConfig) -> AppResult<Self> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a client against a non-default endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_base_url(config: &OpenAiConfig, base_url: &str) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::external_service("Completion API", format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                "Completion API",
                format!("returned {status}: {body}"),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AppError::external_service("Completion API", format!("invalid response: {e}"))
        })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
