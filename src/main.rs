use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use image_forensics::{
    app_state::AppState,
    config::AppConfig,
    routes,
    services::gateway::ServiceRegistry,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing image-forensics server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle =
        routes::metrics::install_recorder().expect("Failed to install Prometheus metrics recorder");

    // Initialize remote service clients
    tracing::info!(
        bucket = %config.r2_bucket,
        max_labels = config.max_labels,
        remote_timeout_secs = config.remote_timeout_secs,
        "Initializing remote service clients"
    );
    let services = ServiceRegistry::from_config(&config).expect("Failed to initialize services");

    // Prepare local storage
    for dir in [&config.upload_dir, &config.json_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .expect("Failed to create local storage directory");
    }

    // Create shared application state and worker pool
    tracing::info!(workers = config.worker_concurrency, "Starting worker pool");
    let state = AppState::from_config(&config, services);

    let app = routes::router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(routes::MAX_UPLOAD_BYTES));

    tracing::info!("Starting image-forensics on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
