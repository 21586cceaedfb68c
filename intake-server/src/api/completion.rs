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

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub message: Option<Value>,
}

impl CompletionRequest {
    /// Text sent upstream. Strings go through unchanged, other JSON values
    /// as their serialized form, `null` or absent as empty text.
    pub fn into_prompt(self) -> String {
        match self.message {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub reply: String,
}

/// POST /api/gemini - Forward one message to the completion provider
///
/// Always answers 200. An absent `message` or an unreadable body is sent
/// upstream as empty text, a non-string `message` as its JSON text.
/// Upstream failures come back as an apology reply.
pub async fn gemini_completion(
    State(state): State<AppState>,
    payload: Result<Json<CompletionRequest>, JsonRejection>,
) -> Json<CompletionResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Unreadable completion body: {}", rejection.body_text());
            CompletionRequest::default()
        }
    };

    let message = request.into_prompt();
    debug!(
        "Completion requested via {} ({} chars)",
        state.completion.provider_name(),
        message.chars().count()
    );

    let reply = state.completion.complete(&message).await;
    Json(CompletionResponse { reply })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, post_json, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_reply_from_provider() {
        let (app, _) = app(Some("Stay indoors"));
        let (status, body) =
            send(&app, post_json("/api/gemini", r#"{"message": "storm tips"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"reply": "Stay indoors [storm tips]"}));
    }

    #[tokio::test]
    async fn test_missing_message_is_forwarded_as_empty() {
        let (app, _) = app(Some("hi"));

        let (status, body) = send(&app, post_json("/api/gemini", "{}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "hi []");

        let (status, body) = send(&app, post_json("/api/gemini", "not json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "hi []");
    }

    #[tokio::test]
    async fn test_non_string_message_is_forwarded() {
        let (app, _) = app(Some("hi"));

        let (status, body) = send(&app, post_json("/api/gemini", r#"{"message": 42}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "hi [42]");

        let (status, body) =
            send(&app, post_json("/api/gemini", r#"{"message": {"q": "flood"}}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], r#"hi [{"q":"flood"}]"#);

        let (_, body) = send(&app, post_json("/api/gemini", r#"{"message": null}"#)).await;
        assert_eq!(body["reply"], "hi []");
    }

    #[tokio::test]
    async fn test_provider_failure_is_still_ok() {
        let (app, _) = app(None);
        let (status, body) = send(&app, post_json("/api/gemini", r#"{"message": "x"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["reply"],
            "Sorry, I couldn't get a response from Gemini. (response is missing 'candidates[0]')"
        );
    }

    #[tokio::test]
    async fn test_completion_does_not_touch_store() {
        let (app, state) = app(Some("ok"));
        send(&app, post_json("/api/gemini", r#"{"message": "x"}"#)).await;
        assert!(state.store.is_empty());
    }
}
