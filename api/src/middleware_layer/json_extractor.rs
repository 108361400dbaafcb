//! Rewrites axum's plain-text extractor rejections into the JSON error shape.

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

#[derive(Serialize)]
struct RejectionBody {
    error: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn hint_for(msg: &str) -> Option<&'static str> {
    if msg.contains("query string") {
        Some("Pass the session as a query parameter, e.g. `?session_id=abc`.")
    } else if msg.contains("missing field") || msg.contains("expected a string") {
        Some("Expected a JSON object like {\"query\": \"...\", \"session_id\": \"...\"}.")
    } else if msg.contains("Content-Type") {
        Some("Send the body with `Content-Type: application/json`.")
    } else {
        None
    }
}

pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    // Only extractor rejections (400/415/422) are rewritten.
    if !matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    if is_json(&parts) {
        return Response::from_parts(parts, bytes.into());
    }

    let original = String::from_utf8_lossy(&bytes);
    let envelope = RejectionBody {
        error: match status {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
            _ => "UNPROCESSABLE_ENTITY",
        },
        detail: original.trim().to_string(),
        hint: hint_for(&original),
    };

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Response::from_parts(parts, body.into())
}
