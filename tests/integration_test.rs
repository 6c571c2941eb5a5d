use image_forensics::{
    config::AppConfig,
    models::job::JobId,
    models::record::{Concept, LabelSet, ResultRecord},
    services::{
        gateway::{BlobStore, ImageSource, ImageStore, ServiceRegistry},
        result_store::ResultStore,
        storage::R2Client,
    },
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Integration test: result record persistence against real R2
///
/// This test verifies:
/// 1. Saving a record writes both the local cache and the R2 object
/// 2. Loading after the local cache is lost repopulates it from R2
/// 3. Unknown identifiers come back as not found
///
/// Note: This requires R2 credentials configured via environment variables.
#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_result_store_against_r2() {
    let config = AppConfig::from_env().expect("Failed to load config");

    let r2_client = R2Client::new(
        &config.r2_bucket,
        &config.r2_endpoint,
        &config.r2_access_key,
        &config.r2_secret_key,
    )
    .expect("Failed to initialize R2");
    let blobs: Arc<dyn BlobStore> = Arc::new(r2_client);

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = ResultStore::new(dir.path(), blobs);

    let id = JobId::new();
    let record = ResultRecord {
        filename: "integration.jpg".to_string(),
        source_url: format!("{}/{}", config.r2_public_url, id.original_image_key()),
        enhanced_url: format!("{}/{}", config.r2_public_url, id.enhanced_image_key()),
        labels: LabelSet::from_concepts(&[Concept::new("test", 0.5)], 8),
        metadata: BTreeMap::new(),
        timestamp: "February 14, 2019 at 5:46 PM".to_string(),
    };

    // 1. Save to both tiers
    store.save(&id, &record).await.expect("Save failed");

    // 2. Drop the local copy and load from R2
    tokio::fs::remove_file(store.cache_path(&id))
        .await
        .expect("Failed to remove cache file");
    let loaded = store.load(&id).await.expect("Record not found in R2");
    assert_eq!(loaded, record);
    assert!(store.cache_path(&id).exists());

    // 3. Unknown identifiers are not found
    assert!(store.load(&JobId::new()).await.is_none());

    println!("✅ Result store integration test passed!");
}

/// Integration test: image upload and public URL resolution
#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_image_store_against_r2() {
    let config = AppConfig::from_env().expect("Failed to load config");
    let services = ServiceRegistry::from_config(&config).expect("Failed to initialize services");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("upload.png");
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([200, 30, 30]));
    img.save(&path).expect("Failed to write test image");

    let public_id = format!("test-{}", JobId::new());
    services
        .images
        .upload(ImageSource::File(&path), &public_id)
        .await
        .expect("Image upload failed");

    let url = services.images.url(&public_id);
    assert!(url.ends_with(&public_id));

    let response = reqwest::get(&url).await.expect("Failed to fetch public URL");
    assert!(response.status().is_success(), "Public URL returned {}", response.status());
}
