//! HTTP liveness endpoint for the hosting platform.

use crate::config::HealthConfig;
use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use seatwatch_backend::WatchEngine;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    engine: WatchEngine,
    started_at: DateTime<Utc>,
}

impl HealthState {
    pub fn new(engine: WatchEngine) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub active_watches: usize,
    pub programs: usize,
    pub uptime_secs: i64,
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(report))
        .route("/health", get(health))
        .with_state(state)
}

async fn report(State(state): State<HealthState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy",
        service: "seatwatch",
        active_watches: state.engine.active_watches().await,
        programs: state.engine.catalog().program_codes().len(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn serve(config: &HealthConfig, state: HealthState) -> anyhow::Result<()> {
    let addr = config.server_address();
    tracing::info!("Starting health server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use seatwatch_backend::engine::Notifier;
    use seatwatch_backend::obs::{ObsClient, ObsEndpoints, ProgramCatalog};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> HealthState {
        let (notifier, _rx) = Notifier::channel();
        let source = ObsClient::new(ObsEndpoints::default()).unwrap();
        let engine = WatchEngine::new(Arc::new(ProgramCatalog::fallback()), Arc::new(source), notifier);
        HealthState::new(engine)
    }

    async fn get_json(path: &str) -> serde_json::Value {
        let response = router(state())
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_root_report() {
        let json = get_json("/").await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "seatwatch");
        assert_eq!(json["active_watches"], 0);
        assert!(json["programs"].as_u64().unwrap() > 100);
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(get_json("/health").await, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let response = router(state())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
