use garde::Validate;
use serde::Serialize;

/// Body returned by `POST /upload` on acceptance.
pub const UPLOAD_SUCCESS: &str = "SUCCESS";
/// Body returned by `POST /upload` on any rejection.
pub const UPLOAD_FAIL: &str = "FAIL";

/// Fields collected from the upload form.
///
/// The email and filename are freeform; only the email's presence is required.
#[derive(Debug, Validate)]
pub struct UploadForm {
    #[garde(length(min = 1))]
    pub email: String,

    #[garde(skip)]
    pub original_filename: String,

    #[garde(length(min = 1))]
    pub image: Vec<u8>,
}

/// Response for an unknown result identifier.
#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub error: String,
}

impl NotFoundResponse {
    pub fn new() -> Self {
        Self {
            error: "not_found".to_string(),
        }
    }
}

impl Default for NotFoundResponse {
    fn default() -> Self {
        Self::new()
    }
}
