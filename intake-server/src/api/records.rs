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
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use intake_core::Record;
use serde::Serialize;
use tracing::debug;

use crate::api::{ApiError, AppState};

/// Response for a successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub data: Record,
}

/// POST /api/register - Store an arbitrary JSON payload
pub async fn register_record(
    State(state): State<AppState>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(record) = payload.map_err(|rejection| {
        debug!("Rejected registration body: {}", rejection.body_text());
        ApiError::Internal(rejection.body_text())
    })?;

    let stored = state.store.append(record);
    debug!("Registered record at index {}", stored.index);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Data received successfully".to_string(),
            data: stored.value,
        }),
    ))
}

/// GET /api/data - Every stored record in insertion order
pub async fn list_records(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.store.list_all())
}

/// GET /api/data/:index - A single record by position
///
/// Anything that is not an in-range run of decimal digits (signed, too
/// large, not a number at all) is a 404.
pub async fn get_record(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<Record>, ApiError> {
    // Only bare digits name a position; signs are rejected before parsing
    let parsed = if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
        index.parse::<i64>().ok()
    } else {
        None
    };
    let Some(index) = parsed else {
        return Err(ApiError::NotFound("Index out of range".to_string()));
    };

    Ok(Json(state.store.get(index)?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, get, post_json, send};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_register_then_list_and_get() {
        let (app, state) = app(Some("ok"));
        let payloads = [
            json!({"name": "Asha", "symptoms": ["fever", "cough"]}),
            json!([1, 2, 3]),
            json!("plain string"),
            json!(null),
        ];

        for payload in &payloads {
            let (status, body) =
                send(&app, post_json("/api/register", &payload.to_string())).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["message"], "Data received successfully");
            assert_eq!(&body["data"], payload);
        }

        assert_eq!(state.store.len(), payloads.len());

        let (status, body) = send(&app, get("/api/data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(payloads));

        for (i, payload) in payloads.iter().enumerate() {
            let (status, body) = send(&app, get(&format!("/api/data/{}", i))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(&body, payload);
        }
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let (app, _) = app(Some("ok"));
        let (status, body) = send(&app, get("/api/data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_get_out_of_range_is_not_found() {
        let (app, _) = app(Some("ok"));
        send(&app, post_json("/api/register", r#"{"a": 1}"#)).await;

        for uri in [
            "/api/data/1",
            "/api/data/-1",
            "/api/data/99999999999999999999",
            "/api/data/abc",
            "/api/data/+0",
            "/api/data/-0",
            "/api/data/0x0",
        ] {
            let (status, body) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body, json!({"error": "Index out of range"}), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_internal_error() {
        let (app, state) = app(Some("ok"));

        let (status, body) = send(&app, post_json("/api/register", "{not json")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().is_empty());

        let missing_content_type = Request::builder()
            .method("POST")
            .uri("/api/register")
            .body(Body::from(r#"{"a": 1}"#))
            .unwrap();
        let (status, body) = send(&app, missing_content_type).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());

        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_registrations() {
        let (app, state) = app(Some("ok"));

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    send(&app, post_json("/api/register", &json!({"seq": i}).to_string())).await
                })
            })
            .collect();

        for task in tasks {
            let (status, _) = task.await.unwrap();
            assert_eq!(status, StatusCode::CREATED);
        }

        let mut seqs: Vec<u64> = state
            .store
            .list_all()
            .iter()
            .map(|r| r["seq"].as_u64().unwrap())
            .collect();
        seqs.sort_unstable();
        assert_eq!(seqs, (0..64).collect::<Vec<_>>());
    }
}
