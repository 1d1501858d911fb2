use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::{Value, json};
use tracing::warn;

use nutricare_core::history::{self, HistoryView};
use nutricare_core::models::{InitialDraft, StoredAssessment};
use nutricare_core::normalize;
use nutricare_core::objective::{self, NutritionalObjective};
use nutricare_core::sort_date;
use nutricare_storage::documents;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub async fn create_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(draft): Json<InitialDraft>,
) -> Result<Json<Value>, ApiError> {
    let prepared = normalize::prepare_initial(&draft, &user.save_context())?;
    for warning in &prepared.warnings {
        warn!(warning = %warning, "assessment saved with advisory finding");
    }

    let prefix = state.assessments_prefix(&user.sub);
    let id =
        documents::create_document(&state.s3, &state.config.bucket, &prefix, prepared.doc).await?;

    Ok(Json(json!({ "id": id, "warnings": prepared.warnings })))
}

pub async fn list_assessments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<StoredAssessment>>, ApiError> {
    let prefix = state.assessments_prefix(&user.sub);
    let records = documents::list_documents(&state.s3, &state.config.bucket, &prefix).await?;
    Ok(Json(records))
}

/// Full history view: all records sorted by resolved save date, grouped by
/// patient. Rebuilt from scratch on every call.
pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<HistoryView>, ApiError> {
    let prefix = state.assessments_prefix(&user.sub);
    let records = documents::list_documents(&state.s3, &state.config.bucket, &prefix).await?;
    Ok(Json(history::build_history(records)))
}

pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<StoredAssessment>, ApiError> {
    let prefix = state.assessments_prefix(&user.sub);
    let record = documents::get_document(&state.s3, &state.config.bucket, &prefix, &id).await?;
    Ok(Json(record))
}

/// The record's resolved nutritional objective, or null when nothing in the
/// document yields one.
pub async fn get_objective(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Option<NutritionalObjective>>, ApiError> {
    let prefix = state.assessments_prefix(&user.sub);
    let record = documents::get_document(&state.s3, &state.config.bucket, &prefix, &id).await?;
    Ok(Json(objective::resolve(&record)))
}

/// One patient's timeline: every assessment sharing a document number,
/// newest first.
pub async fn patient_assessments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(document_number): Path<String>,
) -> Result<Json<Vec<StoredAssessment>>, ApiError> {
    let prefix = state.assessments_prefix(&user.sub);
    let mut records = documents::query_documents(
        &state.s3,
        &state.config.bucket,
        &prefix,
        "generalInfo.documentNumber",
        &Value::String(document_number),
    )
    .await?;
    records.sort_by(|a, b| {
        sort_date::sort_timestamp(&b.doc).cmp(&sort_date::sort_timestamp(&a.doc))
    });
    Ok(Json(records))
}

pub async fn delete_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<()>, ApiError> {
    let prefix = state.assessments_prefix(&user.sub);
    documents::delete_document(&state.s3, &state.config.bucket, &prefix, &id).await?;
    Ok(Json(()))
}
