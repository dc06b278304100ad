use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use docflow::broadcast::JobProgressEvent;
use docflow::pipeline::{CancelFlag, Pipeline, PipelineConfig, ProgressReporter};
use docflow::store::{MemoryStore, SharedStoreConnector, StoreConfig};
use docflow::worker::{collect_jobs, FileJob, JobStatus, StageStatus, WorkerPool};
use docflow::{load_config, Config, HashEmbedder, ProcessorRegistry};
use log::{info, warn};

use crate::IngestArgs;

type CommandResult = Result<bool, Box<dyn Error>>;

const DRY_RUN_ENDPOINT: &str = "memory://dry-run";
const DRY_RUN_COLLECTION: &str = "dry-run";

/// Explicit path, else the default location if it exists, else built-in defaults.
fn resolve_config(path: Option<&Path>) -> docflow::Result<Config> {
    if let Some(path) = path {
        return Ok(load_config(path)?);
    }
    match Config::default_path() {
        Some(default) if default.exists() => {
            info!("Using config {}", default.display());
            Ok(load_config(default)?)
        }
        _ => Ok(Config::default()),
    }
}

/// Logs stage transitions; per-chunk updates only at debug level.
fn log_progress(job: &FileJob) {
    let event = JobProgressEvent::from_job(job);
    let stage = event
        .current_stage
        .map(|s| s.to_string())
        .unwrap_or_default();

    if event.stage_status == Some(StageStatus::InProgress) && event.chunks_total > 0 {
        tracing::debug!(
            job_id = %event.job_id,
            file = %event.file_name,
            embedded = event.chunks_embedded,
            stored = event.chunks_stored,
            total = event.chunks_total,
            "{}", stage
        );
    } else {
        tracing::info!(
            job_id = %event.job_id,
            file = %event.file_name,
            status = %event.status,
            "{}", event.message
        );
    }
}

pub async fn ingest(args: IngestArgs) -> CommandResult {
    let config = resolve_config(args.config.as_deref())?.with_store_overrides(
        args.store_url,
        args.store_api_key,
        args.collection,
    );
    let worker_count = args.workers.unwrap_or(config.worker_count);

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("Cancelling, waiting for running jobs to stop...");
        handler_flag.cancel();
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let (pipeline, store_config) = if args.dry_run {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(
            PipelineConfig::from_config(&config),
            Arc::new(ProcessorRegistry::new(config.extraction.max_file_size_mb)),
            Arc::new(HashEmbedder::new(config.embedding.dimension)),
            Arc::new(SharedStoreConnector::new(store)),
        )?;
        let collection = config
            .store
            .collection_name
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DRY_RUN_COLLECTION.to_string());
        (pipeline, StoreConfig::new(DRY_RUN_ENDPOINT, "dry-run", collection))
    } else {
        (Pipeline::from_config(&config)?, config.store_config()?)
    };
    let pipeline = Arc::new(pipeline.with_cancel_flag(cancel));

    let jobs = collect_jobs(&args.paths, args.recursive)?;
    if jobs.is_empty() {
        warn!("No supported documents found");
        return Ok(true);
    }

    let progress: Arc<dyn ProgressReporter> = Arc::new(log_progress);
    let outcome = WorkerPool::new(pipeline, worker_count)
        .run(jobs, progress, store_config)
        .await;

    if args.json {
        let events: Vec<JobProgressEvent> =
            outcome.jobs.iter().map(JobProgressEvent::from_job).collect();
        let report = serde_json::json!({
            "summary": outcome.summary,
            "jobs": events,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for job in &outcome.jobs {
            match job.status {
                JobStatus::Completed => println!(
                    "ok      {} ({} chunks)",
                    job.source_file.name,
                    job.chunks_stored()
                ),
                _ => println!(
                    "failed  {}: {}",
                    job.source_file.name,
                    job.error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
        println!(
            "\n{} completed, {} failed, {} chunks stored",
            outcome.summary.completed, outcome.summary.failed, outcome.summary.chunks_stored
        );
    }

    Ok(outcome.summary.all_succeeded())
}

pub fn validate_config(path: &Path) -> CommandResult {
    let config = load_config(path)?;
    if let Err(e) = config.store_config() {
        println!("{}: valid, but {}", path.display(), e);
        return Ok(false);
    }
    println!("{}: valid", path.display());
    Ok(true)
}

pub fn show_config(path: Option<&Path>) -> CommandResult {
    let config = resolve_config(path)?;
    let mut value = serde_json::to_value(&config)?;
    mask_credentials(&mut value);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(true)
}

/// Replaces inline API keys with a placeholder, recursively.
fn mask_credentials(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if key == "api_key" && inner.is_string() {
                    *inner = serde_json::Value::String("********".to_string());
                } else {
                    mask_credentials(inner);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(mask_credentials),
        _ => {}
    }
}
