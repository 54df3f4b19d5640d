use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionModel, CompletionResult, Message, Usage};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini completion model via the generateContent API.
pub struct GeminiCompletionModel {
    model_name: String,
    api_key: String,
    default_max_tokens: u32,
    default_temperature: f64,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<ContentTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentTurn>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct ContentTurn {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiCompletionModel {
    pub fn new(
        model_name: &str,
        api_key: &str,
        default_max_tokens: u32,
        default_temperature: f64,
    ) -> Self {
        Self {
            model_name: model_name.to_string(),
            api_key: api_key.to_string(),
            default_max_tokens,
            default_temperature,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl CompletionModel for GeminiCompletionModel {
    async fn complete(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
        temperature: Option<f64>,
    ) -> anyhow::Result<CompletionResult> {
        // Gemini takes the system prompt out of band and names the
        // assistant role "model".
        let system_instruction = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| ContentTurn {
                role: None,
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            });

        let contents: Vec<ContentTurn> = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| ContentTurn {
                role: Some(if m.role == "assistant" {
                    "model".to_string()
                } else {
                    "user".to_string()
                }),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let request = GenerateRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens.unwrap_or(self.default_max_tokens),
                temperature: temperature.unwrap_or(self.default_temperature),
            },
        };

        let url = format!("{API_BASE}/models/{}:generateContent", self.model_name);
        let resp = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini completion API error ({status}): {body}");
        }

        let response: GenerateResponse = resp.json().await?;
        let content = response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.clone())
            .unwrap_or_default();

        let usage = response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(CompletionResult { content, usage })
    }
}
