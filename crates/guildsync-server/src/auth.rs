use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Controls intake authentication.
///
/// When `token` is `None` the middleware is a transparent no-op — all
/// requests pass through. Set a token whenever the intake port is reachable
/// from beyond the moderation host.
#[derive(Clone)]
pub struct IntakeAuth {
    pub token: Option<String>,
}

impl IntakeAuth {
    /// No token configured — middleware passes all requests through.
    pub fn open() -> Self {
        Self { token: None }
    }

    /// Intake is guarded by the given shared token.
    pub fn with_token(token: String) -> Self {
        Self { token: Some(token) }
    }
}

/// Axum middleware that gates requests behind a shared bearer token.
///
/// Auth flow (evaluated in order):
/// 1. `token` is `None` → passthrough (open intake)
/// 2. `Authorization: Bearer TOKEN` matches → passthrough
/// 3. Anything else → 401 JSON
pub async fn auth_middleware(
    State(auth): State<Arc<IntakeAuth>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(ref token) = auth.token else {
        return next.run(req).await;
    };

    let supplied = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if supplied == Some(token.as_str()) {
        return next.run(req).await;
    }

    Response::builder()
        .status(401)
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"error":"unauthorized"}"#))
        .expect("infallible: all header values are valid ASCII")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
