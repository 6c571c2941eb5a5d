use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::models::job::Job;
use crate::services::pipeline::PipelineWorker;

/// In-process job queue: one task per job, at most `concurrency` running a pipeline at once.
pub struct JobQueue {
    worker: Arc<PipelineWorker>,
    permits: Arc<Semaphore>,
    concurrency: usize,
}

impl JobQueue {
    pub fn new(worker: Arc<PipelineWorker>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            worker,
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    /// Schedule a job and return immediately.
    ///
    /// The outcome is logged by the worker and otherwise discarded; callers
    /// are not expected to await the handle.
    pub fn enqueue(&self, job: Job) -> JoinHandle<()> {
        let worker = self.worker.clone();
        let permits = self.permits.clone();

        tracing::info!(job_id = %job.id, "Job enqueued");

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!(job_id = %job.id, "Worker pool closed; job dropped");
                    return;
                }
            };
            metrics::gauge!("forensics_workers_busy").increment(1.0);

            // Failures are already logged with their stage.
            let _ = worker.run(&job).await;

            metrics::gauge!("forensics_workers_busy").decrement(1.0);
        })
    }

    /// Number of jobs currently running a pipeline.
    pub fn busy(&self) -> usize {
        self.concurrency - self.permits.available_permits()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}
