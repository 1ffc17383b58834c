//! Gemini backend implementation
//!
//! HTTP client for the Gemini `generateContent` API. The request pins the
//! response to strict JSON via `response_mime_type` and a response schema,
//! so the model cannot drop the mandatory `rate`/`price`/`summary` fields.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::RawBill;

use super::parsing::parse_bill_response;
use super::VisionBackend;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const EXTRACTION_PROMPT: &str = "You are a precise data extraction engine. Your only job is to \
extract information from the receipt image. For each distinct line item, you MUST extract the \
following three fields from their corresponding columns: 1. `name`: The text from the 'Item \
Name' column. 2. `rate`: The numerical value from the 'Rate' column (price for a single unit). \
3. `price`: The numerical value from the 'Amount' column (the total price for that line). \
CRITICAL INSTRUCTIONS: - Do NOT extract the 'Qty' column. - Do NOT aggregate items. Create a \
separate JSON object for each line. - The fields `name`, `rate`, and `price` are all mandatory \
for every item. Also extract the overall `summary` containing `subtotal`, `tax`, \
`service_charge`, `discounts`, and `total`. Provide clean JSON.";

/// Gemini vision backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Create with a custom base URL (used to point tests at a local server)
    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(&api_key, &model))
    }

    /// Schema the response JSON must conform to
    ///
    /// `rate`/`price` are mandatory per item; `subtotal`/`tax`/`total`
    /// mandatory in the summary.
    fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "items": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "rate": { "type": "NUMBER" },
                            "price": { "type": "NUMBER" }
                        },
                        "required": ["name", "rate", "price"]
                    }
                },
                "summary": {
                    "type": "OBJECT",
                    "properties": {
                        "subtotal": { "type": "NUMBER" },
                        "tax": { "type": "NUMBER" },
                        "service_charge": { "type": "NUMBER" },
                        "discounts": { "type": "NUMBER" },
                        "total": { "type": "NUMBER" }
                    },
                    "required": ["subtotal", "tax", "total"]
                }
            }
        })
    }
}

/// Request to the generateContent API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart {
    Text(String),
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

/// Response from the generateContent API
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl VisionBackend for GeminiBackend {
    async fn extract_bill(&self, image_data: &[u8]) -> Result<RawBill> {
        let base64_image = base64::engine::general_purpose::STANDARD.encode(image_data);

        let request = GeminiRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text(EXTRACTION_PROMPT.to_string()),
                    RequestPart::InlineData {
                        mime_type: "image/jpeg".to_string(),
                        data: base64_image,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Self::response_schema(),
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let gemini_response: GeminiResponse = response.json().await?;
        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| Error::Vision("Gemini returned no text candidate".to_string()))?;

        debug!(model = %self.model, "Gemini extraction response received");
        parse_bill_response(text)
    }

    async fn health_check(&self) -> bool {
        let url = format!(
            "{}/v1beta/models/{}?key={}",
            self.base_url, self.model, self.api_key
        );
        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_requires_api_key() {
        // Construction is explicit here to avoid depending on ambient env
        let backend = GeminiBackend::new("test-key", DEFAULT_MODEL);
        assert_eq!(backend.model(), "gemini-2.5-flash");
        assert_eq!(backend.host(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_request_serializes_inline_data_part() {
        let request = GeminiRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text("extract".to_string()),
                    RequestPart::InlineData {
                        mime_type: "image/jpeg".to_string(),
                        data: "aGk=".to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: GeminiBackend::response_schema(),
            },
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "extract");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(body["generationConfig"]["responseSchema"]["properties"]["summary"].is_object());
    }
}
