use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use nutricare_core::doc_keys;
use nutricare_core::followup::FollowUpSession;

use crate::config::AppConfig;

/// An active follow-up form session, owned by the user who started it.
pub struct SessionEntry {
    pub owner: String,
    pub session: FollowUpSession,
}

/// Shared application state, injected into all route handlers via Axum
/// state.
#[derive(Clone)]
pub struct AppState {
    pub s3: aws_sdk_s3::Client,
    pub cognito: aws_sdk_cognitoidentityprovider::Client,
    pub aws: aws_config::SdkConfig,
    pub config: Arc<AppConfig>,
    /// In-memory follow-up sessions. Each session has exactly one writer
    /// (its form); the map itself is only contended on insert/remove.
    pub sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
}

impl AppState {
    pub fn assessments_prefix(&self, user_id: &str) -> String {
        doc_keys::assessments_prefix(&self.config.namespace, user_id)
    }
}
