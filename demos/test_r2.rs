//! Example: Test R2 Storage Connection
//!
//! This example verifies that your R2 credentials are configured correctly
//! by pushing a result-shaped JSON blob and pulling it back down.
//!
//! Usage:
//!   cargo run --example test_r2
//!
//! Prerequisites:
//!   - .env file with R2 credentials (R2_BUCKET, R2_ENDPOINT, R2_ACCESS_KEY, R2_SECRET_KEY)

use image_forensics::services::gateway::BlobStore;
use image_forensics::services::storage::R2Client;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    println!("🔧 R2 Connection Test\n");

    // Load credentials from environment
    let bucket = env::var("R2_BUCKET").expect("R2_BUCKET not set");
    let endpoint = env::var("R2_ENDPOINT").expect("R2_ENDPOINT not set");
    let access_key = env::var("R2_ACCESS_KEY").expect("R2_ACCESS_KEY not set");
    let secret_key = env::var("R2_SECRET_KEY").expect("R2_SECRET_KEY not set");

    println!("📋 Configuration:");
    println!("   Bucket: {}", bucket);
    println!("   Endpoint: {}", endpoint);
    println!("   Access Key: {}***", &access_key[..8.min(access_key.len())]);
    println!();

    // Initialize R2 client
    println!("🔌 Connecting to R2...");
    let client = R2Client::new(&bucket, &endpoint, &access_key, &secret_key)?;
    println!("✅ Client initialized\n");

    let dir = env::temp_dir().join("image-forensics-r2-test");
    tokio::fs::create_dir_all(&dir).await?;
    let upload_path = dir.join("upload.json");
    let download_path = dir.join("download.json");

    // Test put
    let test_key = "json/connection-test";
    let test_content = br#"{"filename":"connection-test.jpg","labels":{}}"#;
    tokio::fs::write(&upload_path, test_content).await?;

    println!("⬆️  Putting test blob...");
    println!("   Key: {}", test_key);
    println!("   Size: {} bytes", test_content.len());
    client.put(&upload_path, test_key).await?;
    println!("✅ Put successful\n");

    // Test download
    println!("⬇️  Downloading test blob...");
    client.download(test_key, &download_path).await?;
    let downloaded = tokio::fs::read(&download_path).await?;
    println!("✅ Download successful");
    println!("   Size: {} bytes", downloaded.len());
    println!();

    // Verify content matches
    if downloaded == test_content {
        println!("✅ Content verification passed\n");
    } else {
        println!("❌ Content mismatch!");
        return Err("Downloaded content doesn't match uploaded content".into());
    }

    // Verify missing keys are reported as such
    println!("🔍 Checking not-found handling...");
    match client.download("json/does-not-exist", &download_path).await {
        Err(e) if e.is_not_found() => println!("✅ Missing key reported as not found\n"),
        Err(e) => return Err(format!("Unexpected error for missing key: {}", e).into()),
        Ok(()) => return Err("Missing key unexpectedly downloaded".into()),
    }

    println!("🎉 All R2 tests passed!");
    println!("\n✨ Your R2 configuration is working correctly.");

    Ok(())
}
