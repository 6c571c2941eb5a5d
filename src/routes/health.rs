use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::path::Path;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub upload_dir: ComponentHealth,
    pub result_cache: ComponentHealth,
    pub workers: WorkerHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
}

#[derive(Serialize)]
pub struct WorkerHealth {
    pub busy: usize,
    pub capacity: usize,
}

/// GET /health: local storage readiness and worker pool usage.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let upload_check = check_dir(state.staging.dir()).await;
    let cache_check = check_dir(state.results.dir()).await;

    let all_healthy = upload_check.status == "ok" && cache_check.status == "ok";
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            upload_dir: upload_check,
            result_cache: cache_check,
            workers: WorkerHealth {
                busy: state.queue.busy(),
                capacity: state.queue.concurrency(),
            },
        },
    };

    (status_code, Json(response))
}

async fn check_dir(dir: &Path) -> ComponentHealth {
    let usable = match tokio::fs::create_dir_all(dir).await {
        Ok(()) => tokio::fs::metadata(dir)
            .await
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false),
        Err(_) => false,
    };

    ComponentHealth {
        status: if usable { "ok" } else { "error" }.to_string(),
    }
}
