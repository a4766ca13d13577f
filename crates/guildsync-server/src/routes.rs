use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;
use guildsync_core::directive::Directive;
use guildsync_core::types::{CommunityId, UserId};
use guildsync_core::SyncError;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct BanBody {
    pub target: UserId,
    pub actor: UserId,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct MuteBody {
    pub target: UserId,
    pub actor: UserId,
    /// Raw duration token, e.g. "30m" or "1d".
    pub duration: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct LiftBody {
    pub target: UserId,
    pub actor: UserId,
}

#[derive(Deserialize)]
pub struct StatusParams {
    pub actor: UserId,
}

// ---------------------------------------------------------------------------
// Shared dispatch path
// ---------------------------------------------------------------------------

/// Gate the actor, run the fan-out, and deliver the report.
///
/// Privilege is checked in the primary community only; the per-community
/// protected-target checks during dispatch are the orchestrator's business.
/// Rejections (self-target, malformed duration, ...) are domain outcomes and
/// come back as 200 with the rejection inside the report.
async fn run_directive(
    app: &AppState,
    directive: Directive,
) -> Result<Json<serde_json::Value>, AppError> {
    let primary = app.config.primary_community;
    let allowed = app
        .gate
        .has_privilege(app.gateway.as_ref(), primary, directive.actor)
        .await?;
    if !allowed {
        return Err(AppError::forbidden("actor lacks moderation privilege"));
    }

    let report = app
        .orchestrator
        .execute(directive, primary, &app.config.dispatch_order())
        .await;
    let summary = app.reporter.deliver(&report).await;

    Ok(Json(serde_json::json!({
        "report": report,
        "summary": summary,
    })))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/directives/ban — fan a ban out across all communities.
pub async fn ban(
    State(app): State<AppState>,
    Json(body): Json<BanBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    run_directive(&app, Directive::ban(body.target, body.actor, body.reason)).await
}

/// POST /api/directives/mute — fan a timed mute out across all communities.
pub async fn mute(
    State(app): State<AppState>,
    Json(body): Json<MuteBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    run_directive(
        &app,
        Directive::mute(body.target, body.actor, body.duration, body.reason),
    )
    .await
}

/// POST /api/directives/unmute — lift a mute everywhere it holds.
pub async fn unmute(
    State(app): State<AppState>,
    Json(body): Json<LiftBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    run_directive(&app, Directive::unmute(body.target, body.actor)).await
}

/// POST /api/directives/unban — lift a ban everywhere it holds.
pub async fn unban(
    State(app): State<AppState>,
    Json(body): Json<LiftBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    run_directive(&app, Directive::unban(body.target, body.actor)).await
}

/// GET /api/status — per-community connectivity and capability report.
pub async fn status(
    State(app): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    run_directive(&app, Directive::status_query(params.actor)).await
}

/// GET /api/health — liveness plus the number of armed mute timers.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "active_mutes": app.timers.len(),
    }))
}

/// GET /api/communities/:id — connectivity and capabilities of one enrolled
/// community. Communities outside the configured sync set are 404.
pub async fn community(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let community = CommunityId(id);
    if !app.config.is_enrolled(community) {
        return Err(SyncError::NotEnrolled(community).into());
    }
    match app.gateway.community_profile(community).await? {
        Some(profile) => Ok(Json(serde_json::json!({
            "id": profile.id,
            "name": profile.name,
            "connected": true,
            "can_ban": profile.can_ban,
            "can_moderate": profile.can_moderate,
        }))),
        None => Ok(Json(serde_json::json!({
            "id": community,
            "connected": false,
        }))),
    }
}

/// GET /api/config — effective configuration and its validation warnings.
pub async fn get_config(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "primary_community": app.config.primary_community,
        "dispatch_order": app.config.dispatch_order(),
        "audit_channel": app.config.audit_channel,
        "privilege_role": app.config.privilege_role,
        "warnings": app.config.validate(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
