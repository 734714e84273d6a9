//! Analysis request/response cycle against the Gemini generateContent API

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ChatConfig;
use crate::error::AnalysisError;

const GENERATE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Analytical precision over creativity.
const TEMPERATURE: f32 = 0.3;

/// Who authored a conversation turn, in the wire vocabulary of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    fn as_wire(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One prior conversation turn sent as history.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

/// Seam between the session and the model endpoint, so conversation logic
/// can be tested without network access.
pub trait AnalysisBackend {
    /// Single synchronous call, no retries. Returns the raw reply text
    /// verbatim; chart-directive decoding happens elsewhere.
    fn generate(
        &self,
        system_instruction: &str,
        history: &[Turn],
        question: &str,
    ) -> Result<String, AnalysisError>;
}

/// Blocking HTTP backend for the Gemini REST endpoint.
pub struct GeminiBackend {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(config: &ChatConfig) -> Result<Self, AnalysisError> {
        let api_key = config.resolve_api_key()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::new(format!("http client build failed: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
        })
    }
}

impl AnalysisBackend for GeminiBackend {
    fn generate(
        &self,
        system_instruction: &str,
        history: &[Turn],
        question: &str,
    ) -> Result<String, AnalysisError> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_wire()),
                parts: vec![Part { text: &turn.text }],
            })
            .collect();
        contents.push(Content {
            role: Some("user"),
            parts: vec![Part { text: question }],
        });

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            contents,
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let url = format!("{}/{}:generateContent", GENERATE_ENDPOINT, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| AnalysisError::new(format!("request transport failure: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::warn!("generateContent returned HTTP {}: {}", status, body);
            return Err(AnalysisError::new(format!("HTTP {}", status)));
        }

        let reply: GenerateResponse = response
            .json()
            .map_err(|e| AnalysisError::new(format!("malformed response body: {}", e)))?;

        let text = reply.reply_text();
        if text.is_empty() {
            return Err(AnalysisError::new("response contained no text parts"));
        }
        Ok(text)
    }
}

// Wire shapes for the v1beta generateContent call.

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "system_instruction")]
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn reply_text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
