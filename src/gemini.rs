use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::engine::Analyzer;
use crate::extract::json_candidate;
use crate::prompt::build_analysis_prompt;
use crate::types::{AnalysisResult, ImagePayload};

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Sustainability analysis backed by Gemini's `generateContent` API.
#[derive(Clone)]
pub struct GeminiAnalyzer {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiAnalyzer {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self {
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key,
            client,
        })
    }

    async fn generate(&self, prompt: &str, image: &ImagePayload) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text { text: prompt },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type(),
                            data: STANDARD.encode(&image.bytes),
                        },
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to generate content")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Gemini API error ({}): {}", status, text);
        }

        let result: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        first_candidate_text(result)
    }
}

fn first_candidate_text(response: GenerateResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No response generated from Gemini"))?;

    candidate
        .content
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| anyhow!("First Gemini candidate has no text content"))
}

/// Parses model output into an [`AnalysisResult`], tolerating prose around
/// the JSON object.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult> {
    let candidate = json_candidate(text);
    tracing::trace!(extracted = candidate, "Extracted JSON");
    serde_json::from_str(candidate)
        .with_context(|| format!("Failed to parse response. Response text: {}", candidate))
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    #[tracing::instrument(skip(self, image), fields(image_bytes = image.bytes.len()))]
    async fn analyze(
        &self,
        categories: &[String],
        image: &ImagePayload,
    ) -> Result<AnalysisResult> {
        let prompt = build_analysis_prompt(categories);
        tracing::debug!(%prompt, "Sending prompt to Gemini");

        let text = self.generate(&prompt, image).await?;
        tracing::debug!(response = %text, "Raw Gemini response");

        parse_analysis(&text)
    }
}
