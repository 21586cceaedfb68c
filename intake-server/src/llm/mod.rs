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

//! Completion proxy
//!
//! Forwards a single user message to a generative-language provider and hands
//! back the reply text. Every provider failure is folded into a readable reply
//! string instead of an error, so callers always get text back.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

mod providers;
pub use providers::*;

/// Reasons a provider call can fail
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("upstream error {code}: {message}")]
    Upstream { code: u64, message: String },

    #[error("response is missing '{0}'")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout
        } else {
            CompletionError::Transport(err)
        }
    }
}

#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one message and return the first candidate's text
    async fn complete(&self, message: &str) -> Result<String, CompletionError>;

    /// Service name shown to users in fallback replies
    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

/// Fail-soft front for a [`CompletionProvider`]
#[derive(Clone)]
pub struct CompletionProxy {
    provider: Arc<dyn CompletionProvider>,
}

impl CompletionProxy {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Ask the provider for a reply. Never fails: errors become an apology
    /// string that carries the failure detail.
    pub async fn complete(&self, message: &str) -> String {
        let start = Instant::now();

        match self.provider.complete(message).await {
            Ok(reply) => {
                debug!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Completion succeeded"
                );
                reply
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Completion failed: {}",
                    e
                );
                fallback_reply(self.provider.name(), &e)
            }
        }
    }
}

/// Reply text used when the provider could not produce an answer
pub fn fallback_reply(service: &str, reason: &impl Display) -> String {
    format!(
        "Sorry, I couldn't get a response from {}. ({})",
        service, reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait::async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(&self, message: &str) -> Result<String, CompletionError> {
            Ok(format!("echo: {}", message))
        }

        fn name(&self) -> &str {
            "Echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl CompletionProvider for FailingProvider {
        async fn complete(&self, _message: &str) -> Result<String, CompletionError> {
            Err(CompletionError::MissingField("candidates[0]"))
        }

        fn name(&self) -> &str {
            "Gemini"
        }

        fn model(&self) -> &str {
            "gemini-pro"
        }
    }

    #[tokio::test]
    async fn test_successful_reply_is_passed_through() {
        let proxy = CompletionProxy::new(Arc::new(EchoProvider));
        assert_eq!(proxy.complete("hello").await, "echo: hello");
        assert_eq!(proxy.complete("").await, "echo: ");
    }

    #[tokio::test]
    async fn test_failure_becomes_fallback_reply() {
        let proxy = CompletionProxy::new(Arc::new(FailingProvider));
        assert_eq!(
            proxy.complete("hello").await,
            "Sorry, I couldn't get a response from Gemini. (response is missing 'candidates[0]')"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(CompletionError::Timeout.to_string(), "request timed out");
        assert_eq!(
            CompletionError::Upstream {
                code: 400,
                message: "API key not valid".to_string()
            }
            .to_string(),
            "upstream error 400: API key not valid"
        );
        assert_eq!(
            fallback_reply("Gemini", &"boom"),
            "Sorry, I couldn't get a response from Gemini. (boom)"
        );
    }
}
