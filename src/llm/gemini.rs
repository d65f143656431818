//! Gemini REST client implementing the [`LanguageModel`] capability.

use crate::language::Language;
use crate::llm::{prompts, LanguageModel};
use crate::{Result, SaarthiError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Temperature used for conversational replies.
const REPLY_TEMPERATURE: f32 = 0.7;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build a client from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| SaarthiError::ConfigError("GEMINI_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| SaarthiError::ModelError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(SaarthiError::ModelError(format!(
                "HTTP {}: {}",
                status,
                extract_error_message(&body_text)
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SaarthiError::ModelError(format!("Unreadable response: {}", e)))?;

        extract_text(parsed)
            .ok_or_else(|| SaarthiError::ModelError("Response carried no text".to_string()))
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate_reply(
        &self,
        message: &str,
        language: Language,
        context: &str,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: prompts::reply_content(message, context),
                }],
            }],
            system_instruction: Some(Content {
                parts: vec![Part::Text {
                    text: prompts::behavioral_directive(language),
                }],
            }),
            generation_config: Some(GenerationConfig {
                temperature: REPLY_TEMPERATURE,
            }),
        };
        self.send_request(&request).await
    }

    async fn explain_document(
        &self,
        data: &[u8],
        mime_type: &str,
        language: Language,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: mime_type.to_string(),
                            data: BASE64_STANDARD.encode(data),
                        },
                    },
                    Part::Text {
                        text: prompts::document_instruction(language),
                    },
                ],
            }],
            system_instruction: Some(Content {
                parts: vec![Part::Text {
                    text: prompts::behavioral_directive(language),
                }],
            }),
            generation_config: None,
        };
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .find_map(|part| part.text)
}

fn extract_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorWrapper {
        error: ErrorBody,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|w| w.error.message)
        .unwrap_or_else(|| body.to_string())
}
