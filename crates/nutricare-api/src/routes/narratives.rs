use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use nutricare_bedrock::{narrative, summary};
use nutricare_core::models::StoredAssessment;
use nutricare_storage::documents;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub assessment_id: String,
}

#[derive(Serialize)]
pub struct NarrativeResponse {
    pub text: String,
}

/// Draft a nutritional diagnosis for a record. Diagnosis and plan drafting
/// are independent actions and may overlap; the frontend only prevents
/// overlapping invocations of the same one.
pub async fn draft_diagnosis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<NarrativeRequest>,
) -> Result<Json<NarrativeResponse>, ApiError> {
    let record = load_record(&state, &user, &req.assessment_id).await?;
    let summary = summary::record_summary(&record);
    let text = narrative::draft_diagnosis(&state.aws, &state.config.model_id, &summary).await?;
    Ok(Json(NarrativeResponse { text }))
}

/// Draft a management plan for a record.
pub async fn draft_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<NarrativeRequest>,
) -> Result<Json<NarrativeResponse>, ApiError> {
    let record = load_record(&state, &user, &req.assessment_id).await?;
    let summary = summary::record_summary(&record);
    let text = narrative::draft_plan(&state.aws, &state.config.model_id, &summary).await?;
    Ok(Json(NarrativeResponse { text }))
}

async fn load_record(
    state: &AppState,
    user: &AuthUser,
    assessment_id: &str,
) -> Result<StoredAssessment, ApiError> {
    let prefix = state.assessments_prefix(&user.sub);
    let record =
        documents::get_document(&state.s3, &state.config.bucket, &prefix, assessment_id).await?;
    Ok(record)
}
