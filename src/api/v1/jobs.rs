//! Job API endpoints - submit a batch, poll it, download or cancel it

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, error, info, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, JobCreated, JobStatusResponse, SkippedResponse};
use crate::domain::{
    BatchOptions, BatchOutcome, CancelSignal, ClientLimit, DomainError, GeocodingProvider, Job,
    JobStatus, ProgressReporter,
};
use crate::infrastructure::batch::{
    write_archive, BatchOrchestrator, BatchRequest, WatchProgress, ARCHIVE_FILE,
};
use crate::infrastructure::geocoding::GeocodingClient;
use crate::infrastructure::records::{read_skip_report, SKIP_REPORT_FILE};
use crate::infrastructure::render::{HtmlMailerRenderer, MailerAssets};

const UPLOADS_DIR: &str = "uploads";
const OUTPUT_DIR: &str = "output";
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Files and form fields of one submission
#[derive(Debug, Default)]
struct JobUpload {
    clients_csv: Option<PathBuf>,
    sold_csv: Option<PathBuf>,
    top_banner: Option<PathBuf>,
    bottom_banner: Option<PathBuf>,
    right_side_image: Option<PathBuf>,
    api_key: Option<String>,
    num_nearby: Option<usize>,
    num_clients: Option<String>,
}

impl JobUpload {
    fn options(&self, defaults: &BatchOptions) -> BatchOptions {
        let mut options = defaults
            .clone()
            .with_client_limit(ClientLimit::parse(self.num_clients.as_deref().unwrap_or("all")));

        if let Some(num_nearby) = self.num_nearby {
            options = options.with_num_nearby(num_nearby);
        }

        options
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    FsPath::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::bad_request(format!("Failed to read multipart field: {}", err.body_text()))
}

/// Save uploads below `uploads_dir` under fixed names; client file names never reach the disk
async fn read_upload(mut multipart: Multipart, uploads_dir: &FsPath) -> Result<JobUpload, ApiError> {
    let mut upload = JobUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let extension = field
            .file_name()
            .filter(|file_name| !file_name.trim().is_empty())
            .map(|file_name| extension_of(file_name).unwrap_or_default());

        match name.as_str() {
            "client_csv" | "sold_csv" => {
                let Some(extension) = extension else {
                    continue;
                };
                if extension != "csv" {
                    let label = if name == "client_csv" { "Client" } else { "Sold homes" };
                    return Err(ApiError::bad_request(format!("{} file must be a CSV", label))
                        .with_param(name.clone()));
                }

                let path = uploads_dir.join(format!("{}.csv", name));
                let data = field.bytes().await.map_err(multipart_error)?;
                tokio::fs::write(&path, &data).await.map_err(DomainError::from)?;

                if name == "client_csv" {
                    upload.clients_csv = Some(path);
                } else {
                    upload.sold_csv = Some(path);
                }
            }
            "top_banner" | "bottom_banner" | "right_side_image" => {
                // Unsupported image types are ignored
                let Some(extension) = extension.filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
                else {
                    continue;
                };

                let path = uploads_dir.join(format!("{}.{}", name, extension));
                let data = field.bytes().await.map_err(multipart_error)?;
                tokio::fs::write(&path, &data).await.map_err(DomainError::from)?;

                match name.as_str() {
                    "top_banner" => upload.top_banner = Some(path),
                    "bottom_banner" => upload.bottom_banner = Some(path),
                    _ => upload.right_side_image = Some(path),
                }
            }
            "api_key" | "mapbox_token" => {
                let value = field.text().await.map_err(multipart_error)?;
                let value = value.trim();
                if !value.is_empty() {
                    upload.api_key = Some(value.to_string());
                }
            }
            "num_nearby" => {
                let value = field.text().await.map_err(multipart_error)?;
                let value = value.trim();
                if !value.is_empty() {
                    let parsed = value.parse::<usize>().map_err(|_| {
                        ApiError::bad_request(format!("Invalid num_nearby '{}'", value))
                            .with_param("num_nearby")
                    })?;
                    upload.num_nearby = Some(parsed);
                }
            }
            "num_clients" => {
                upload.num_clients = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    if upload.clients_csv.is_none() || upload.sold_csv.is_none() {
        return Err(ApiError::bad_request("Both CSV files are required"));
    }

    Ok(upload)
}

async fn discard_work_dir(work_dir: &FsPath) {
    if let Err(e) = tokio::fs::remove_dir_all(work_dir).await {
        debug!(path = %work_dir.display(), error = %e, "Failed to discard job directory");
    }
}

/// POST /v1/jobs - Upload both lists and start a background batch
pub async fn create_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = state.job_service.cleanup_old().await {
        warn!(error = %e, "Failed to purge expired jobs");
    }

    let work_dir = state
        .settings
        .work_root
        .join(uuid::Uuid::new_v4().to_string());
    let uploads_dir = work_dir.join(UPLOADS_DIR);
    tokio::fs::create_dir_all(&uploads_dir)
        .await
        .map_err(DomainError::from)?;

    let prepared = async {
        let upload = read_upload(multipart, &uploads_dir).await?;
        let provider = state
            .build_provider(upload.api_key.as_deref())
            .map_err(ApiError::from)?;
        let job = state
            .job_service
            .create_pending(work_dir.clone())
            .await
            .map_err(ApiError::from)?;
        Ok::<_, ApiError>((upload, provider, job))
    }
    .await;

    let (upload, provider, job) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            discard_work_dir(&work_dir).await;
            return Err(e);
        }
    };

    let job_id = job.id().to_string();
    info!(
        job_id = %job_id,
        provider = provider.provider_name(),
        "Accepted mailer job"
    );

    tokio::spawn(run_job(state, job, upload, provider));

    Ok((StatusCode::ACCEPTED, Json(JobCreated { job_id })))
}

/// Execute a job in the background and record its outcome
///
/// Returns a boxed future to keep the spawned task small.
fn run_job(
    state: AppState,
    job: Job,
    upload: JobUpload,
    provider: Arc<dyn GeocodingProvider>,
) -> BoxFuture<'static, ()> {
    async move {
        let job_id = job.id().to_string();

        if let Err(e) = state.job_service.mark_running(&job_id).await {
            warn!(job_id = %job_id, error = %e, "Failed to mark job as running");
            return;
        }

        let cancel = state
            .job_service
            .cancel_signal(&job_id)
            .await
            .unwrap_or_default();

        let (progress, mut receiver) = WatchProgress::channel();
        let forwarder = {
            let service = state.job_service.clone();
            let job_id = job_id.clone();
            tokio::spawn(async move {
                while receiver.changed().await.is_ok() {
                    let progress = receiver.borrow_and_update().clone();
                    if let Err(e) = service.update_progress(&job_id, progress).await {
                        debug!(job_id = %job_id, error = %e, "Dropped progress update");
                    }
                }
            })
        };

        let result = execute_job(
            &state,
            job.work_dir(),
            &upload,
            provider,
            Arc::new(progress),
            cancel,
        )
        .await;

        // The last sender went away with the orchestrator
        let _ = forwarder.await;

        let recorded = match result {
            Ok((outcome, archive)) => state
                .job_service
                .mark_done(
                    &job_id,
                    outcome.rendered_count(),
                    outcome.skipped_count(),
                    Some(archive),
                )
                .await
                .map(|_| ()),
            Err(DomainError::Cancelled) => {
                info!(job_id = %job_id, "Job stopped after cancellation");
                state
                    .job_service
                    .finish_cancelled(&job_id)
                    .await
                    .map(|_| ())
            }
            Err(e) => state
                .job_service
                .mark_failed(&job_id, e.to_string(), Some(format!("{:?}", e)))
                .await
                .map(|_| ()),
        };

        if let Err(e) = recorded {
            error!(job_id = %job_id, error = %e, "Failed to record job outcome");
        }
    }
    .boxed()
}

async fn execute_job(
    state: &AppState,
    work_dir: &FsPath,
    upload: &JobUpload,
    provider: Arc<dyn GeocodingProvider>,
    progress: Arc<dyn ProgressReporter>,
    cancel: CancelSignal,
) -> Result<(BatchOutcome, PathBuf), DomainError> {
    let (Some(clients_csv), Some(sold_csv)) = (&upload.clients_csv, &upload.sold_csv) else {
        return Err(DomainError::input("Both CSV files are required"));
    };

    let assets = MailerAssets::load(
        upload.top_banner.as_deref(),
        upload.bottom_banner.as_deref(),
        upload.right_side_image.as_deref(),
    )
    .await?;

    let output_dir = work_dir.join(OUTPUT_DIR);
    let renderer = HtmlMailerRenderer::new(output_dir.clone())
        .with_brand(state.settings.brand.clone())
        .with_assets(assets);
    let geocoder = GeocodingClient::new(provider, state.geocode_cache.clone())
        .with_key_format(state.settings.key_format.clone());

    let orchestrator = BatchOrchestrator::new(Arc::new(geocoder), Arc::new(renderer))
        .with_progress(progress)
        .with_cancel(cancel);

    let request = BatchRequest {
        clients_csv: clients_csv.clone(),
        sold_csv: sold_csv.clone(),
        output_dir: output_dir.clone(),
        options: upload.options(&state.settings.batch_options),
    };

    let outcome = orchestrator.run_files(&request).await?;
    drop(orchestrator);

    let archive = write_archive(&output_dir, &work_dir.join(ARCHIVE_FILE)).await?;
    Ok((outcome, archive))
}

async fn get_required(state: &AppState, job_id: &str) -> Result<Job, ApiError> {
    state
        .job_service
        .get(job_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Job '{}' not found", job_id)))
}

/// GET /v1/jobs/{job_id} - Poll a job
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = get_required(&state, &job_id).await?;
    Ok(Json(JobStatusResponse::from(job)))
}

/// GET /v1/jobs/{job_id}/download - Fetch the archive of a finished job
///
/// The job and its directory are removed once the archive has been read.
pub async fn download_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let job = get_required(&state, &job_id).await?;

    if job.status() != JobStatus::Done {
        return Err(ApiError::bad_request("Job not finished yet"));
    }

    let Some(archive_path) = job.archive_path() else {
        return Err(ApiError::not_found("ZIP file not found"));
    };
    let bytes = match tokio::fs::read(archive_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("ZIP file not found"));
        }
        Err(e) => return Err(ApiError::from(DomainError::from(e))),
    };

    if let Err(e) = state.job_service.remove(&job_id).await {
        warn!(job_id = %job_id, error = %e, "Failed to remove downloaded job");
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"mailers.zip\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /v1/jobs/{job_id}/skipped - Skip report rows as JSON
pub async fn get_skipped(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<SkippedResponse>, ApiError> {
    let job = get_required(&state, &job_id).await?;
    let report = job.work_dir().join(OUTPUT_DIR).join(SKIP_REPORT_FILE);

    let skipped = if tokio::fs::try_exists(&report).await.unwrap_or(false) {
        read_skip_report(&report).await.map_err(ApiError::from)?
    } else {
        Vec::new()
    };

    Ok(Json(SkippedResponse::from(skipped)))
}

/// DELETE /v1/jobs/{job_id} - Cancel a queued or running job
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = state
        .job_service
        .cancel(&job_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(JobStatusResponse::from(job)))
}
