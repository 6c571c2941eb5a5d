use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    gateway::ServiceRegistry,
    pipeline::{PipelineSettings, PipelineWorker},
    queue::JobQueue,
    result_store::ResultStore,
    staging::ImageStaging,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub staging: ImageStaging,
    pub results: Arc<ResultStore>,
    pub worker: Arc<PipelineWorker>,
    pub queue: Arc<JobQueue>,
}

impl AppState {
    pub fn new(
        services: ServiceRegistry,
        upload_dir: impl Into<PathBuf>,
        json_dir: impl Into<PathBuf>,
        settings: PipelineSettings,
        concurrency: usize,
    ) -> Self {
        let staging = ImageStaging::new(upload_dir);
        let results = Arc::new(ResultStore::new(json_dir, services.blobs.clone()));
        let worker = Arc::new(PipelineWorker::new(
            services,
            results.clone(),
            staging.clone(),
            settings,
        ));
        let queue = Arc::new(JobQueue::new(worker.clone(), concurrency));

        Self {
            staging,
            results,
            worker,
            queue,
        }
    }

    pub fn from_config(config: &AppConfig, services: ServiceRegistry) -> Self {
        Self::new(
            services,
            config.upload_dir.clone(),
            config.json_dir.clone(),
            PipelineSettings::from_config(config),
            config.worker_concurrency,
        )
    }
}
