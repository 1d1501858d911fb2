use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use nutricare_core::followup::{FollowUpSession, SessionPhase};
use nutricare_core::models::{FollowUpDraft, NutritionalRecalculation};
use nutricare_core::objective::NutritionalObjective;
use nutricare_storage::documents;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::{AppState, SessionEntry};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub parent_assessment_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub parent_id: String,
    /// The parent's resolved objective, shown as the comparison baseline.
    pub objective: Option<NutritionalObjective>,
}

/// Start a follow-up session from a parent assessment. Refuses when the
/// parent cannot be loaded — a follow-up has nothing to reconcile against.
pub async fn start_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let prefix = state.assessments_prefix(&user.sub);
    let parent = documents::get_document(
        &state.s3,
        &state.config.bucket,
        &prefix,
        &req.parent_assessment_id,
    )
    .await?;

    let session = FollowUpSession::start(Some(parent))?;
    let view = SessionView {
        session_id: Uuid::new_v4(),
        phase: session.phase(),
        parent_id: session.parent().id.clone(),
        objective: session.objective().cloned(),
    };

    state.sessions.lock().await.insert(
        view.session_id,
        SessionEntry {
            owner: user.sub.clone(),
            session,
        },
    );

    Ok(Json(view))
}

/// Commit a completed recalculation into the session. Last write wins; the
/// committed result is the one persisted at save time.
pub async fn submit_recalculation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
    Json(result): Json<NutritionalRecalculation>,
) -> Result<Json<Value>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let entry = owned_session(&mut sessions, session_id, &user)?;
    entry.session.begin_recalculation()?;
    entry.session.complete_recalculation(result)?;
    Ok(Json(json!({ "phase": entry.session.phase() })))
}

/// Build and persist the follow-up record. Fails with a conflict when the
/// recalculation step was never completed.
pub async fn save_follow_up(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
    Json(draft): Json<FollowUpDraft>,
) -> Result<Json<Value>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let entry = owned_session(&mut sessions, session_id, &user)?;

    let prepared = entry.session.build_record(&draft, &user.save_context())?;
    for warning in &prepared.warnings {
        warn!(warning = %warning, "follow-up saved with advisory finding");
    }

    let prefix = state.assessments_prefix(&user.sub);
    let id =
        documents::create_document(&state.s3, &state.config.bucket, &prefix, prepared.doc).await?;
    entry.session.mark_saved()?;
    sessions.remove(&session_id);

    Ok(Json(json!({ "id": id, "warnings": prepared.warnings })))
}

/// Drop an abandoned session.
pub async fn discard_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<()>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    owned_session(&mut sessions, session_id, &user)?;
    sessions.remove(&session_id);
    Ok(Json(()))
}

fn owned_session<'a>(
    sessions: &'a mut std::collections::HashMap<Uuid, SessionEntry>,
    session_id: Uuid,
    user: &AuthUser,
) -> Result<&'a mut SessionEntry, ApiError> {
    sessions
        .get_mut(&session_id)
        .filter(|entry| entry.owner == user.sub)
        .ok_or_else(|| ApiError::NotFound(format!("no active follow-up session: {session_id}")))
}
