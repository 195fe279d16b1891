//! Gemini REST API backend.
//!
//! Implements both core traits against the same endpoint family:
//! - `Generator` via `models/{model}:streamGenerateContent?alt=sse`,
//!   forwarding text deltas as they arrive.
//! - `Judge` via `models/{model}:generateContent` with a JSON response
//!   mime type; the verdict is parsed strictly and never coerced.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace, warn};

use agentforge_core::{GenerationError, Generator, Judge, JudgeError, JudgeVerdict};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Gemini provider for generation and evaluation.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Concatenated text of the first candidate's parts.
    fn extract_text(event: &serde_json::Value) -> Option<String> {
        let parts = event["candidates"][0]["content"]["parts"].as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Strip markdown code fences the model sometimes wraps JSON in.
    fn strip_code_fences(text: &str) -> String {
        text.replace("```json", "").replace("```", "").trim().to_string()
    }

    /// The evaluation prompt sent to the judge endpoint.
    fn judge_prompt(config_summary: &str, transcript: &str) -> String {
        format!(
            "你是一个专业的 AI 智能体评测专家。请根据以下智能体的配置和最近的对话历史，对其表现进行深度评测。\n\n\
### 智能体配置：\n\
{config_summary}\n\n\
### 历史对话记录：\n\
{transcript}\n\n\
### 评测要求：\n\
请从以下 3 个维度进行打分（每个维度满分 20 分，总分最高 60 分）：\n\
1. 知识与数据应用 (Knowledge & Data Usage)：在刚才的对话中，智能体是否有效利用了已挂载的知识库或业务数据？有没有出现幻觉？\n\
2. 问答合理性与逻辑 (Reasoning & Logic)：客观评价智能体的回答是否合理、逻辑是否严密？是否解决了用户的问题？\n\
3. 性能与 Token 利用率 (Performance & Efficiency)：回答是否啰嗦？是否在合理的篇幅内（Token利用率高）给出了有效信息？\n\n\
请返回 JSON 格式的评测结果，严格遵循以下结构：\n\
{{\n\
  \"dynamicScore\": 55,\n\
  \"dimensions\": [\n\
    {{\"name\": \"知识与数据应用\", \"score\": 18, \"analysis\": \"简短的分析说明...\"}},\n\
    {{\"name\": \"问答合理性与逻辑\", \"score\": 18, \"analysis\": \"简短的分析说明...\"}},\n\
    {{\"name\": \"性能与 Token 利用率\", \"score\": 19, \"analysis\": \"简短的分析说明...\"}}\n\
  ],\n\
  \"suggestions\": [\"具体的调优建议 1\", \"具体的调优建议 2\"]\n\
}}"
        )
    }
}

#[async_trait]
impl Generator for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<String, GenerationError>>, GenerationError>
    {
        if self.api_key.is_empty() {
            return Err(GenerationError::NotConfigured("missing API key".into()));
        }

        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"temperature": self.temperature},
        });

        debug!(provider = "gemini", model = %self.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(GenerationError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(GenerationError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(GenerationError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(GenerationError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = line.strip_prefix("data: ") {
                        let data = data.trim();
                        if data.is_empty() || data == "[DONE]" {
                            continue;
                        }

                        let event: serde_json::Value = match serde_json::from_str(data) {
                            Ok(v) => v,
                            Err(e) => {
                                trace!(error = %e, data = %data, "Ignoring unparseable Gemini SSE");
                                continue;
                            }
                        };

                        if let Some(text) = Self::extract_text(&event) {
                            if tx.send(Ok(text)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[async_trait]
impl Judge for GeminiProvider {
    async fn judge(
        &self,
        config_summary: &str,
        transcript: &str,
    ) -> Result<JudgeVerdict, JudgeError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{"parts": [{"text": Self::judge_prompt(config_summary, transcript)}]}],
            "generationConfig": {"responseMimeType": "application/json"},
        });

        debug!(provider = "gemini", model = %self.model, "Sending judge request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| JudgeError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini judge API error");
            return Err(JudgeError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::Malformed(format!("unparseable response body: {e}")))?;

        let text = api_resp
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| JudgeError::Malformed("response contains no candidates".into()))?;

        let cleaned = Self::strip_code_fences(text);
        let verdict: JudgeVerdict = serde_json::from_str(&cleaned)
            .map_err(|e| JudgeError::Malformed(format!("invalid verdict JSON: {e}")))?;
        verdict.validate()?;
        Ok(verdict)
    }
}

// --- Gemini API types ---

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}
