use axum::extract::{Multipart, State};
use garde::Validate;

use crate::app_state::AppState;
use crate::models::job::{Job, JobId};
use crate::models::submission::{UploadForm, UPLOAD_FAIL, UPLOAD_SUCCESS};

/// POST /upload: stage an image and start its analysis in the background.
///
/// Always answers 200; the body is `SUCCESS` or `FAIL`. The job identifier
/// only reaches the submitter through the notification email.
pub async fn upload_image(State(state): State<AppState>, multipart: Multipart) -> &'static str {
    let form = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(reason) => {
            tracing::info!(reason, "Rejected upload");
            return UPLOAD_FAIL;
        }
    };

    if let Err(report) = form.validate() {
        tracing::info!(error = %report, "Rejected upload");
        return UPLOAD_FAIL;
    }

    if image::guess_format(&form.image).is_err() {
        tracing::info!(reason = "unrecognised image format", "Rejected upload");
        return UPLOAD_FAIL;
    }

    let id = JobId::new();
    if let Err(e) = state.staging.stage(&id, &form.image).await {
        tracing::error!(job_id = %id, error = %e, "Failed to stage upload");
        return UPLOAD_FAIL;
    }

    metrics::counter!("forensics_jobs_submitted_total").increment(1);

    state.queue.enqueue(Job {
        id,
        email: form.email,
        original_filename: form.original_filename,
    });

    UPLOAD_SUCCESS
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, &'static str> {
    let mut image = None;
    let mut original_filename = None;
    let mut email = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| "malformed multipart body")?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("filedata") => {
                original_filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|_| "unreadable file field")?;
                image = Some(data.to_vec());
            }
            Some("email") => {
                email = Some(field.text().await.map_err(|_| "unreadable email field")?);
            }
            _ => {}
        }
    }

    Ok(UploadForm {
        email: email.ok_or("missing email")?,
        original_filename: original_filename.unwrap_or_default(),
        image: image.ok_or("missing filedata")?,
    })
}
