//! Run one job in the foreground for an image on disk.
//!
//! Usage: worker <image-path> <email> [display-name]
//!
//! The image is staged under a fresh job identifier exactly as an upload
//! would be, then the pipeline runs to completion before the process exits.

use image_forensics::{
    app_state::AppState,
    config::AppConfig,
    models::job::{Job, JobId},
    services::gateway::ServiceRegistry,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let mut args = std::env::args().skip(1);
    let (image_path, email) = match (args.next(), args.next()) {
        (Some(path), Some(email)) => (PathBuf::from(path), email),
        _ => {
            eprintln!("usage: worker <image-path> <email> [display-name]");
            return ExitCode::from(2);
        }
    };
    let display_name = args.next();

    match run(image_path, email, display_name).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Worker run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    image_path: PathBuf,
    email: String,
    display_name: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    tracing::info!("Initializing services");
    let services = ServiceRegistry::from_config(&config)?;
    let state = AppState::from_config(&config, services);

    let original_filename = display_name.unwrap_or_else(|| {
        image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let data = tokio::fs::read(&image_path).await?;
    let id = JobId::new();
    state.staging.stage(&id, &data).await?;

    tracing::info!(job_id = %id, path = %image_path.display(), "Processing image");

    let job = Job {
        id,
        email,
        original_filename,
    };
    let record = state.worker.run(&job).await?;

    println!("{}", id);
    println!("{}", config.result_link(&id));
    tracing::info!(
        job_id = %id,
        labels = record.labels.len(),
        "Result available"
    );

    Ok(())
}
