//! In-memory gateway fakes and a harness wiring them into the application.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use image_forensics::app_state::AppState;
use image_forensics::models::job::{Job, JobId};
use image_forensics::models::record::Concept;
use image_forensics::services::gateway::{
    BlobStore, Classifier, Colourizer, ImageSource, ImageStore, Notification, Notifier,
    ServiceError, ServiceRegistry,
};
use image_forensics::services::pipeline::PipelineSettings;
use image_forensics::services::storage::StorageError;

pub const PUBLIC_HOST: &str = "forensics.test";
pub const IMAGE_BASE_URL: &str = "https://images.test";
pub const COLOURIZED_URL: &str = "https://colorizer.test/outputs/output.jpg";

/// Classifier returning a fixed concept list, optionally slowly or not at all.
pub struct FakeClassifier {
    concepts: Vec<Concept>,
    fail: bool,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeClassifier {
    pub fn returning(concepts: Vec<Concept>) -> Self {
        Self {
            concepts,
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(Vec::new())
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, _image_url: &str) -> Result<Vec<Concept>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::UnexpectedResponse("no outputs in response".to_string()));
        }
        Ok(self.concepts.clone())
    }
}

pub struct FakeColourizer {
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeColourizer {
    pub fn working() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Colourizer for FakeColourizer {
    async fn colourize(&self, _image_url: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::UnexpectedResponse("missing output_url".to_string()));
        }
        Ok(COLOURIZED_URL.to_string())
    }
}

/// What an image store upload was given.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredImage {
    Bytes(Vec<u8>),
    FromUrl(String),
}

#[derive(Default)]
pub struct MemoryImageStore {
    pub images: Mutex<HashMap<String, StoredImage>>,
    fail: bool,
}

impl MemoryImageStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn get(&self, public_id: &str) -> Option<StoredImage> {
        self.images.lock().unwrap().get(public_id).cloned()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(&self, source: ImageSource<'_>, public_id: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::UnexpectedStatus {
                key: public_id.to_string(),
                status: 503,
            });
        }
        let stored = match source {
            ImageSource::File(path) => StoredImage::Bytes(tokio::fs::read(path).await?),
            ImageSource::Remote(url) => StoredImage::FromUrl(url.to_string()),
        };
        self.images.lock().unwrap().insert(public_id.to_string(), stored);
        Ok(())
    }

    fn url(&self, public_id: &str) -> String {
        format!("{}/{}", IMAGE_BASE_URL, public_id)
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub puts: AtomicUsize,
    pub downloads: AtomicUsize,
    fail_puts: bool,
}

impl MemoryBlobStore {
    pub fn failing_puts() -> Self {
        Self {
            fail_puts: true,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts {
            return Err(StorageError::UnexpectedStatus {
                key: key.to_string(),
                status: 500,
            });
        }
        let data = tokio::fs::read(local_path).await?;
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let data = self
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        tokio::fs::write(local_path, data).await?;
        Ok(())
    }
}

pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn messages(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &Notification) -> Result<(), ServiceError> {
        if self.fail {
            return Err(ServiceError::UnexpectedResponse("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn sample_concepts() -> Vec<Concept> {
    vec![Concept::new("cat", 0.9123), Concept::new("dog", 0.501)]
}

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        max_labels: 8,
        remote_timeout: Duration::from_secs(5),
        sender_address: format!("forensics@{}", PUBLIC_HOST),
        public_host: PUBLIC_HOST.to_string(),
    }
}

/// Application state wired to in-memory fakes inside a temporary directory.
pub struct Harness {
    pub dir: TempDir,
    pub classifier: Arc<FakeClassifier>,
    pub colourizer: Arc<FakeColourizer>,
    pub images: Arc<MemoryImageStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: AppState,
}

pub struct HarnessBuilder {
    classifier: FakeClassifier,
    colourizer: FakeColourizer,
    images: MemoryImageStore,
    blobs: MemoryBlobStore,
    notifier: RecordingNotifier,
    settings: PipelineSettings,
    concurrency: usize,
}

impl HarnessBuilder {
    pub fn classifier(mut self, classifier: FakeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn colourizer(mut self, colourizer: FakeColourizer) -> Self {
        self.colourizer = colourizer;
        self
    }

    pub fn images(mut self, images: MemoryImageStore) -> Self {
        self.images = images;
        self
    }

    pub fn blobs(mut self, blobs: MemoryBlobStore) -> Self {
        self.blobs = blobs;
        self
    }

    pub fn notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.settings.remote_timeout = timeout;
        self
    }

    pub fn max_labels(mut self, max_labels: usize) -> Self {
        self.settings.max_labels = max_labels;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn build(self) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let classifier = Arc::new(self.classifier);
        let colourizer = Arc::new(self.colourizer);
        let images = Arc::new(self.images);
        let blobs = Arc::new(self.blobs);
        let notifier = Arc::new(self.notifier);

        let services = ServiceRegistry {
            classifier: classifier.clone(),
            colourizer: colourizer.clone(),
            images: images.clone(),
            blobs: blobs.clone(),
            notifier: notifier.clone(),
        };

        let state = AppState::new(
            services,
            dir.path().join("uploads"),
            dir.path().join("json"),
            self.settings,
            self.concurrency,
        );

        Harness {
            dir,
            classifier,
            colourizer,
            images,
            blobs,
            notifier,
            state,
        }
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            classifier: FakeClassifier::returning(sample_concepts()),
            colourizer: FakeColourizer::working(),
            images: MemoryImageStore::default(),
            blobs: MemoryBlobStore::default(),
            notifier: RecordingNotifier::new(),
            settings: settings(),
            concurrency: 4,
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Stage `data` as an upload and describe the job for it.
    pub async fn stage(&self, data: &[u8]) -> Job {
        let id = JobId::new();
        self.state.staging.stage(&id, data).await.unwrap();
        Job {
            id,
            email: "someone@example.com".to_string(),
            original_filename: "holiday.jpg".to_string(),
        }
    }
}

/// A small valid PNG.
pub fn sample_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([90, 90, 90]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// Smallest JPEG carrying an EXIF segment with `Make` and `Model` tags.
pub fn jpeg_with_exif(make: &str, model: &str) -> Vec<u8> {
    let entries = [(0x010Fu16, make), (0x0110u16, model)];
    let ifd_len = 2 + entries.len() * 12 + 4;
    let mut data_offset = 8 + ifd_len;

    let mut ifd = Vec::new();
    let mut data = Vec::new();
    ifd.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, value) in entries {
        let count = value.len() + 1;
        ifd.extend_from_slice(&tag.to_le_bytes());
        ifd.extend_from_slice(&2u16.to_le_bytes());
        ifd.extend_from_slice(&(count as u32).to_le_bytes());
        if count <= 4 {
            let mut inline = [0u8; 4];
            inline[..value.len()].copy_from_slice(value.as_bytes());
            ifd.extend_from_slice(&inline);
        } else {
            ifd.extend_from_slice(&(data_offset as u32).to_le_bytes());
            data.extend_from_slice(value.as_bytes());
            data.push(0);
            data_offset += count;
        }
    }
    ifd.extend_from_slice(&0u32.to_le_bytes());

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&ifd);
    tiff.extend_from_slice(&data);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// Wait until `condition` holds, polling every 10ms for up to two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
