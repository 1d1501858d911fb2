use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{delete, get, post};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod routes;
mod state;

use config::AppConfig;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;

    let aws = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()))
        .load()
        .await;
    let s3 = nutricare_storage::client::build_client_with_region(&config.region).await;
    let cognito = nutricare_auth::client::build_client_with_region(&config.region).await;

    let addr = config.addr.clone();
    let state = AppState {
        s3,
        cognito,
        aws,
        config: Arc::new(config),
        sessions: Arc::new(Mutex::new(HashMap::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/assessments", get(routes::assessments::list_assessments))
        .route("/assessments", post(routes::assessments::create_assessment))
        .route("/assessments/history", get(routes::assessments::history))
        .route("/assessments/{id}", get(routes::assessments::get_assessment))
        .route(
            "/assessments/{id}",
            delete(routes::assessments::delete_assessment),
        )
        .route(
            "/assessments/{id}/objective",
            get(routes::assessments::get_objective),
        )
        .route(
            "/patients/{documentNumber}/assessments",
            get(routes::assessments::patient_assessments),
        )
        .route("/followups/sessions", post(routes::followups::start_session))
        .route(
            "/followups/sessions/{id}/recalculation",
            post(routes::followups::submit_recalculation),
        )
        .route(
            "/followups/sessions/{id}/save",
            post(routes::followups::save_follow_up),
        )
        .route(
            "/followups/sessions/{id}",
            delete(routes::followups::discard_session),
        )
        .route(
            "/narratives/diagnosis",
            post(routes::narratives::draft_diagnosis),
        )
        .route("/narratives/plan", post(routes::narratives::draft_plan))
        .layer(axum_mw::from_fn(middleware::auth::require_auth));

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/confirm", post(routes::auth::confirm_signup))
        .route("/auth/logout", post(routes::auth::logout))
        .merge(protected)
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
