//! Example: Test Clarifai Connection
//!
//! This example verifies that your Clarifai credentials are configured
//! correctly by classifying a publicly hosted image.
//!
//! Usage:
//!   cargo run --example test_classifier -- [image-url]
//!
//! Prerequisites:
//!   - .env file with CLARIFAI_API_KEY (CLARIFAI_MODEL_URL optional)

use image_forensics::models::record::LabelSet;
use image_forensics::services::classifier::ClarifaiClient;
use image_forensics::services::gateway::Classifier;
use std::env;

const GENERAL_MODEL_URL: &str = "https://api.clarifai.com/v2/models/aaa03c23b3724a16a56b629203edc62c/versions/aa7f35c01e0642fda5cf400f543e7c40/outputs";
const SAMPLE_IMAGE_URL: &str = "https://samples.clarifai.com/metro-north.jpg";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    println!("🤖 Clarifai Connection Test\n");

    let api_key = env::var("CLARIFAI_API_KEY").expect("CLARIFAI_API_KEY not set");
    let model_url = env::var("CLARIFAI_MODEL_URL").unwrap_or_else(|_| GENERAL_MODEL_URL.to_string());
    let image_url = env::args().nth(1).unwrap_or_else(|| SAMPLE_IMAGE_URL.to_string());

    println!("📋 Configuration:");
    println!("   API Key: {}***", &api_key[..6.min(api_key.len())]);
    println!("   Model: {}", model_url);
    println!("   Image: {}", image_url);
    println!();

    let client = ClarifaiClient::new(reqwest::Client::new(), &model_url, &api_key);

    println!("🔄 Sending classification request...");
    match client.classify(&image_url).await {
        Ok(concepts) => {
            println!("✅ API call successful ({} concepts)\n", concepts.len());
            println!("📊 Stored labels:");
            for label in LabelSet::from_concepts(&concepts, 8).iter() {
                println!("   {:<20} {:>6.2}", label.name, label.confidence);
            }
        }
        Err(e) => {
            println!("❌ API call failed: {}", e);
            println!("\n🔍 Troubleshooting:");
            println!("   1. Verify CLARIFAI_API_KEY is correct");
            println!("   2. Check the image URL is publicly reachable");
            return Err(e.into());
        }
    }

    println!("\n🎉 Clarifai is responding correctly!");

    Ok(())
}
