// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use super::{CompletionError, CompletionProvider};
use crate::config::LLMConfig;
use serde_json::{json, Value};

// Gemini Provider
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, config: &LLMConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, message: &str) -> Result<String, CompletionError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": message }] }],
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let json: Value =
            serde_json::from_str(&text).map_err(|e| CompletionError::Decode(e.to_string()))?;

        extract_reply(&json, status.as_u16())
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a `generateContent` body
///
/// An `error` object in the body wins over everything else. Zero candidates or
/// zero parts are reported as a missing field like any other shape mismatch.
pub fn extract_reply(body: &Value, status: u16) -> Result<String, CompletionError> {
    if let Some(error) = body.get("error") {
        return Err(CompletionError::Upstream {
            code: error["code"].as_u64().unwrap_or(status as u64),
            message: error["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    let candidate = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .ok_or(CompletionError::MissingField("candidates[0]"))?;

    let part = candidate
        .pointer("/content/parts/0")
        .ok_or(CompletionError::MissingField("candidates[0].content.parts[0]"))?;

    part.get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(CompletionError::MissingField(
            "candidates[0].content.parts[0].text",
        ))
}
