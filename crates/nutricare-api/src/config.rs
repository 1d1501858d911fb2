use std::env;

/// Runtime configuration, read once at startup. The bucket is the only hard
/// requirement; everything else has a workable default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub region: String,
    pub bucket: String,
    /// Collection scoping string prefixed to every document key.
    pub namespace: String,
    /// Bedrock inference profile used for narrative drafting.
    pub model_id: String,
    pub cognito_user_pool_id: String,
    pub cognito_client_id: String,
}

const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

impl AppConfig {
    pub fn from_env() -> eyre::Result<Self> {
        let bucket =
            env::var("NUTRICARE_BUCKET").map_err(|_| eyre::eyre!("NUTRICARE_BUCKET is not set"))?;
        Ok(AppConfig {
            addr: env::var("NUTRICARE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket,
            namespace: env::var("NUTRICARE_NAMESPACE").unwrap_or_else(|_| "nutricare".to_string()),
            model_id: env::var("NUTRICARE_MODEL_ID")
                .unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string()),
            cognito_user_pool_id: env::var("COGNITO_USER_POOL_ID")
                .unwrap_or_else(|_| "us-east-1_placeholder".to_string()),
            cognito_client_id: env::var("COGNITO_CLIENT_ID").unwrap_or_default(),
        })
    }
}
