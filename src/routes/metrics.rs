use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

/// Install the global Prometheus recorder and register the service metrics.
pub fn install_recorder() -> Result<Arc<PrometheusHandle>, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(
        "forensics_jobs_submitted_total",
        "Uploads accepted and handed to the worker pool"
    );
    metrics::describe_counter!(
        "forensics_jobs_completed_total",
        "Jobs whose record was persisted"
    );
    metrics::describe_counter!(
        "forensics_jobs_failed_total",
        "Jobs aborted, labelled by the failing stage"
    );
    metrics::describe_histogram!(
        "forensics_job_processing_seconds",
        "Wall time of a successful pipeline run"
    );
    metrics::describe_counter!(
        "forensics_result_cache_misses_total",
        "Result lookups that fell back to the durable store"
    );
    metrics::describe_counter!(
        "forensics_result_not_found_total",
        "Result lookups that found no record in either tier"
    );
    metrics::describe_gauge!(
        "forensics_workers_busy",
        "Jobs currently running a pipeline"
    );

    Ok(Arc::new(handle))
}

/// GET /metrics: Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}
