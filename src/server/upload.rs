//! `POST /process-pdf`: multipart intake and the blackout response.

use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use tracing::{debug, info, instrument};

use super::artifact::{ArtifactPair, DeliveryStream};
use super::auth::verify_access;
use super::error::ApiError;
use super::AppState;
use crate::error::{RedactorError, RedactorResult};
use crate::redaction::RedactionReport;

pub const HEADER_REDACTED_PAGES: &str = "x-redacted-pages";
pub const HEADER_REDACTION_PARTIAL: &str = "x-redaction-partial";

/// Fields pulled out of the multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub password: Option<String>,
    pub pdf_password: Option<String>,
    pub file_name: Option<String>,
    pub file: Option<Bytes>,
}

pub fn is_pdf_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

fn multipart_error(err: MultipartError, max: u64) -> RedactorError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RedactorError::UploadTooLarge { max }
    } else {
        RedactorError::InvalidUpload {
            reason: err.body_text(),
        }
    }
}

/// Reads a file field while enforcing the size limit.
///
/// Returns `Ok(None)` once the limit is crossed; the rest of the field is
/// left for the multipart reader to skip.
async fn read_limited(field: &mut Field<'_>, max: u64) -> RedactorResult<Option<Bytes>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max))? {
        if (buf.len() + chunk.len()) as u64 > max {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(Bytes::from(buf)))
}

impl UploadForm {
    /// Parses the form, checking the access credential as soon as it
    /// arrives. File problems are held back until the caller is known to
    /// be authorised, so an unauthorised request always sees 401.
    pub async fn read(multipart: &mut Multipart, state: &AppState) -> RedactorResult<Self> {
        let max = state.config().limits.max_upload_bytes;
        let mut form = UploadForm::default();
        let mut deferred: Option<RedactorError> = None;

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "password" => {
                    let supplied = field.text().await.map_err(|e| multipart_error(e, max))?;
                    verify_access(&state.config().access, &supplied)?;
                    form.password = Some(supplied);
                }
                "pdf_password" => {
                    let text = field.text().await.map_err(|e| multipart_error(e, max))?;
                    if !text.is_empty() {
                        form.pdf_password = Some(text);
                    }
                }
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    if !is_pdf_filename(&file_name) {
                        deferred.get_or_insert(RedactorError::InvalidUpload {
                            reason: "Only PDF files are allowed.".to_string(),
                        });
                    } else {
                        match read_limited(&mut field, max).await? {
                            Some(bytes) => form.file = Some(bytes),
                            None => {
                                deferred.get_or_insert(RedactorError::UploadTooLarge { max });
                            }
                        }
                    }
                    form.file_name = Some(file_name);
                }
                other => debug!(field = other, "ignoring unknown form field"),
            }
        }

        if form.password.is_none() {
            return Err(RedactorError::AccessDenied);
        }
        if let Some(err) = deferred {
            return Err(err);
        }
        if form.file.is_none() {
            return Err(RedactorError::InvalidUpload {
                reason: "No file provided".to_string(),
            });
        }
        Ok(form)
    }
}

#[instrument(skip_all)]
pub async fn process_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = UploadForm::read(&mut multipart, &state).await?;
    let bytes = form.file.unwrap_or_default();

    let artifacts = ArtifactPair::allocate(&state.config().storage.scratch_dir);
    tokio::fs::write(artifacts.input.path(), &bytes)
        .await
        .map_err(|source| RedactorError::Io {
            path: artifacts.input.path().to_path_buf(),
            source,
        })?;
    drop(bytes);

    info!(
        file = form.file_name.as_deref().unwrap_or_default(),
        "processing upload"
    );

    let service = state.service().clone();
    let pdf_password = form.pdf_password;
    let (report, output) = tokio::task::spawn_blocking(move || {
        let ArtifactPair { input, output } = artifacts;
        let result = service.redact(input.path(), output.path(), pdf_password.as_deref());
        drop(input);
        result.map(|report| (report, output))
    })
    .await
    .map_err(|e| RedactorError::processing("Redaction task failed", None, e))??;

    let body = tokio::fs::read(output.path())
        .await
        .map_err(|source| RedactorError::Io {
            path: output.path().to_path_buf(),
            source,
        })?;

    Ok(pdf_response(body, output, &report))
}

fn pdf_response(
    body: Vec<u8>,
    output: super::artifact::TempArtifact,
    report: &RedactionReport,
) -> Response {
    let redacted = report.redacted_count().to_string();
    let partial = if report.is_partial() { "true" } else { "false" };

    let mut response = Response::new(Body::from_stream(DeliveryStream::new(body, output)));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"processed.pdf\""),
    );
    if let Ok(value) = HeaderValue::from_str(&redacted) {
        headers.insert(HEADER_REDACTED_PAGES, value);
    }
    headers.insert(HEADER_REDACTION_PARTIAL, HeaderValue::from_static(partial));
    response
}
