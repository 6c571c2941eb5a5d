//! Per-job processing pipeline.
//!
//! One run uploads the staged original, classifies it, reads its EXIF,
//! colourises it, stores the colourised copy, persists the assembled record
//! and emails the submitter a link. Any remote failure before persistence
//! aborts the job with nothing written.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use strum::Display;

use crate::config::{result_link, AppConfig};
use crate::models::job::Job;
use crate::models::record::{timestamp_now, LabelSet, ResultRecord};
use crate::services::gateway::{ImageSource, Notification, ServiceRegistry};
use crate::services::metadata;
use crate::services::result_store::ResultStore;
use crate::services::staging::ImageStaging;

pub const NOTIFICATION_SUBJECT: &str = "Results";

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    UploadOriginal,
    Classify,
    ExtractMetadata,
    Colourize,
    UploadEnhanced,
    Persist,
    Notify,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_labels: usize,
    pub remote_timeout: Duration,
    pub sender_address: String,
    pub public_host: String,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_labels: config.max_labels,
            remote_timeout: config.remote_timeout(),
            sender_address: config.sender_address(),
            public_host: config.public_host.clone(),
        }
    }
}

pub struct PipelineWorker {
    services: ServiceRegistry,
    results: Arc<ResultStore>,
    staging: ImageStaging,
    settings: PipelineSettings,
}

impl PipelineWorker {
    pub fn new(
        services: ServiceRegistry,
        results: Arc<ResultStore>,
        staging: ImageStaging,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            services,
            results,
            staging,
            settings,
        }
    }

    /// Run every stage for one job whose image is already staged.
    #[tracing::instrument(name = "job", skip(self, job), fields(job_id = %job.id))]
    pub async fn run(&self, job: &Job) -> Result<ResultRecord, PipelineError> {
        let start = Instant::now();
        let outcome = self.process(job).await;
        let elapsed = start.elapsed();

        match &outcome {
            Ok(record) => {
                metrics::counter!("forensics_jobs_completed_total").increment(1);
                metrics::histogram!("forensics_job_processing_seconds").record(elapsed.as_secs_f64());
                tracing::info!(
                    duration_ms = elapsed.as_millis() as u64,
                    labels = record.labels.len(),
                    exif_tags = record.metadata.len(),
                    "Job completed"
                );
            }
            Err(e) => {
                metrics::counter!("forensics_jobs_failed_total", "stage" => e.stage().to_string())
                    .increment(1);
                tracing::error!(stage = %e.stage(), error = %e, "Job failed");
            }
        }

        outcome
    }

    async fn process(&self, job: &Job) -> Result<ResultRecord, PipelineError> {
        let id = &job.id;
        let services = &self.services;
        let image_path = self.staging.path_for(id);

        // EXIF reading has no remote dependency; overlap it with the first uploads.
        let metadata_task = tokio::task::spawn_blocking({
            let path = image_path.clone();
            move || metadata::extract(&path)
        });

        let original_key = id.original_image_key();
        self.call(
            Stage::UploadOriginal,
            services.images.upload(ImageSource::File(&image_path), &original_key),
        )
        .await?;
        let source_url = services.images.url(&original_key);

        let concepts = self
            .call(Stage::Classify, services.classifier.classify(&source_url))
            .await?;
        let labels = LabelSet::from_concepts(&concepts, self.settings.max_labels);
        tracing::debug!(returned = concepts.len(), kept = labels.len(), "Classification complete");

        let metadata = metadata_task.await.unwrap_or_else(|e| {
            tracing::warn!(stage = %Stage::ExtractMetadata, error = %e, "Metadata extraction aborted");
            BTreeMap::new()
        });

        let colourized_url = self
            .call(Stage::Colourize, services.colourizer.colourize(&source_url))
            .await?;

        let enhanced_key = id.enhanced_image_key();
        self.call(
            Stage::UploadEnhanced,
            services.images.upload(ImageSource::Remote(&colourized_url), &enhanced_key),
        )
        .await?;
        let enhanced_url = services.images.url(&enhanced_key);

        let record = ResultRecord {
            filename: job.original_filename.clone(),
            source_url,
            enhanced_url,
            labels,
            metadata,
            timestamp: timestamp_now(),
        };

        self.call(Stage::Persist, self.results.save(id, &record)).await?;

        self.notify(job).await;

        Ok(record)
    }

    /// Send the result link. Failures are logged; the record is already durable.
    async fn notify(&self, job: &Job) {
        let message = Notification {
            from: self.settings.sender_address.clone(),
            to: job.email.clone(),
            subject: NOTIFICATION_SUBJECT.to_string(),
            body: format!(
                "Please see the results: {}",
                result_link(&self.settings.public_host, &job.id)
            ),
        };

        match self.call(Stage::Notify, self.services.notifier.send(&message)).await {
            Ok(()) => tracing::info!("Submitter notified"),
            Err(e) => tracing::warn!(error = %e, "Notification not sent"),
        }
    }

    /// Await one remote call under the per-call timeout, tagging failures with their stage.
    async fn call<T, E, F>(&self, stage: Stage, call: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        tracing::debug!(stage = %stage, "Stage started");
        match tokio::time::timeout(self.settings.remote_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(PipelineError::Failed {
                stage,
                source: Box::new(e),
            }),
            Err(_) => Err(PipelineError::TimedOut {
                stage,
                timeout: self.settings.remote_timeout,
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{stage} failed: {source}")]
    Failed {
        stage: Stage,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{stage} timed out after {}s", .timeout.as_secs_f64())]
    TimedOut { stage: Stage, timeout: Duration },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Failed { stage, .. } | PipelineError::TimedOut { stage, .. } => *stage,
        }
    }
}
