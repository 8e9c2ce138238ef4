//! Background import pipeline: a job queue feeding one worker thread that
//! decodes uploaded logs, writes the binary artifact, and eagerly computes
//! stats for every label.

use crate::codec::writer::write_artifact_file;
use crate::config::ImporterConfig;
use crate::error::{Error, Result};
use crate::model::stats::{CodeCounts, Histogram, Percentiles, Stats, Timeseries};
use crate::model::{ImportJob, LogStatus, Sample, Samples};
use crate::parsing::csv_source::decode_file;
use crate::stats::builder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tracing::{error, info};

/// Label id reserved for the whole-batch "Overall" series.
pub const OVERALL_LABEL_ID: i64 = 0;

/// Updates a log's lifecycle status. Log storage itself lives elsewhere.
pub trait LogStore: Send + Sync {
    fn update_status(&self, log_id: i64, status: LogStatus) -> Result<()>;
}

/// Receives computed statistics, keyed by log and label id.
pub trait StatsStore: Send + Sync {
    fn create_sample_labels(&self, log_id: i64, labels: &[String]) -> Result<()>;
    fn create_or_update_aggregate(&self, log_id: i64, label_id: i64, stats: &Stats)
        -> Result<()>;
    fn create_or_update_timeseries(
        &self,
        log_id: i64,
        label_id: i64,
        timeseries: &Timeseries,
    ) -> Result<()>;
    fn create_or_update_histogram(
        &self,
        log_id: i64,
        label_id: i64,
        histogram: &Histogram,
    ) -> Result<()>;
    fn create_or_update_percentiles(
        &self,
        log_id: i64,
        label_id: i64,
        percentiles: &Percentiles,
    ) -> Result<()>;
    fn create_or_update_code_counts(
        &self,
        log_id: i64,
        label_id: i64,
        counts: &CodeCounts,
    ) -> Result<()>;
}

/// Accepts import jobs and works through them on a single background thread.
///
/// `shutdown` is cooperative: the job being processed finishes, anything
/// still queued is abandoned.
pub struct ImportService {
    sender: Mutex<Option<Sender<ImportJob>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown: Arc<AtomicBool>,
    logs: Arc<dyn LogStore>,
}

impl ImportService {
    /// Creates the converted-artifact directory and starts the worker thread.
    pub fn start(
        logs: Arc<dyn LogStore>,
        stats: Arc<dyn StatsStore>,
        config: ImporterConfig,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.converted_dir)?;

        let (sender, receiver) = mpsc::channel::<ImportJob>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker_logs = Arc::clone(&logs);
        let worker_shutdown = Arc::clone(&shutdown);
        let handle = std::thread::Builder::new()
            .name("log-importer".to_string())
            .spawn(move || {
                while !worker_shutdown.load(Ordering::SeqCst) {
                    match receiver.recv() {
                        Ok(job) => process_job(&job, &*worker_logs, &*stats, &config),
                        // Sender gone: no more jobs can ever arrive.
                        Err(_) => break,
                    }
                }
                info!("import worker stopped");
            })?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
            shutdown,
            logs,
        })
    }

    /// Marks the log queued and hands the job to the worker.
    pub fn submit(&self, job: ImportJob) -> Result<()> {
        self.logs.update_status(job.log_id, LogStatus::Queued)?;
        let sender = self.sender.lock().map_err(|_| {
            Error::Internal("import queue lock poisoned".to_string())
        })?;
        match sender.as_ref() {
            Some(sender) => sender
                .send(job)
                .map_err(|_| Error::Internal("import worker is gone".to_string())),
            None => Err(Error::Internal("import service is shut down".to_string())),
        }
    }

    /// Stops the worker once its current job (if any) completes. Queued jobs
    /// are dropped. Safe to call more than once.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Ok(mut sender) = self.sender.lock() {
            // Dropping the sender wakes a worker blocked on recv.
            sender.take();
        }
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

fn process_job(
    job: &ImportJob,
    logs: &dyn LogStore,
    stats: &dyn StatsStore,
    config: &ImporterConfig,
) {
    if let Err(err) = logs.update_status(job.log_id, LogStatus::Importing) {
        error!("could not mark log {} importing: {}", job.log_id, err);
    }

    let batch = match convert(job, config) {
        Ok(batch) => batch,
        Err(err) => {
            error!("could not import log {}: {}", job.log_id, err);
            if let Err(err) = logs.update_status(job.log_id, LogStatus::ImportFailed) {
                error!("could not mark log {} failed: {}", job.log_id, err);
            }
            return;
        }
    };

    if let Err(err) = logs.update_status(job.log_id, LogStatus::Complete) {
        error!("could not mark log {} complete: {}", job.log_id, err);
    }
    info!("imported log {}", job.log_id);

    // Stats are a bonus on top of a completed import. A failure here is
    // logged and the log stays complete.
    if let Err(err) = eager_calculate_stats(job.log_id, batch, stats, config.span_millis) {
        error!(
            "stats calculation stopped early for log {}: {}",
            job.log_id, err
        );
    }
}

/// Decode, optionally sort, encode. Returns the decoded batch for the stats
/// phase.
fn convert(job: &ImportJob, config: &ImporterConfig) -> Result<Samples> {
    let mut batch = decode_file(&job.source_path)?;
    if config.sort_samples {
        batch.samples.sort_by(Sample::cmp_temporal);
    }
    let artifact_path = config.converted_dir.join(format!("{}.bin", job.log_id));
    let hash = write_artifact_file(&batch, &artifact_path)?;
    info!(
        "converted log {} to {} (sha256={})",
        job.log_id,
        artifact_path.display(),
        hash
    );
    Ok(batch)
}

fn eager_calculate_stats(
    log_id: i64,
    mut batch: Samples,
    stats: &dyn StatsStore,
    span_millis: i64,
) -> Result<()> {
    let samples = &mut batch.samples;

    let overall_counts = builder::calc_aggregate_counts(samples);
    let overall_counts_series = builder::calc_timeseries_counts(samples, span_millis);
    let overall_series = builder::calc_timeseries_stats(samples, span_millis);
    let overall_aggregate = builder::calc_aggregate_stats(samples);
    let (overall_histogram, overall_percentiles) = builder::calc_histogram(samples)?;

    let groups = builder::sort_and_split_by_label(samples);
    let mut labels = Vec::with_capacity(groups.len() + 1);
    labels.push("Overall".to_string());
    labels.extend(groups.iter().map(|(label, _)| label.clone()));
    stats.create_sample_labels(log_id, &labels)?;

    stats.create_or_update_code_counts(log_id, OVERALL_LABEL_ID, &overall_counts)?;
    stats.create_or_update_code_counts(log_id, OVERALL_LABEL_ID, &overall_counts_series)?;
    stats.create_or_update_timeseries(log_id, OVERALL_LABEL_ID, &overall_series)?;
    stats.create_or_update_aggregate(log_id, OVERALL_LABEL_ID, &overall_aggregate)?;
    stats.create_or_update_histogram(log_id, OVERALL_LABEL_ID, &overall_histogram)?;
    stats.create_or_update_percentiles(log_id, OVERALL_LABEL_ID, &overall_percentiles)?;

    for (i, (_, range)) in groups.iter().enumerate() {
        let label_id = i as i64 + 1;
        // Sorting inside the range keeps the per-label grouping intact.
        let group = &mut samples[range.clone()];
        let counts = builder::calc_aggregate_counts(group);
        let counts_series = builder::calc_timeseries_counts(group, span_millis);
        let series = builder::calc_timeseries_stats(group, span_millis);
        let aggregate = builder::calc_aggregate_stats(group);
        let (histogram, percentiles) = builder::calc_histogram(group)?;

        stats.create_or_update_code_counts(log_id, label_id, &counts)?;
        stats.create_or_update_code_counts(log_id, label_id, &counts_series)?;
        stats.create_or_update_timeseries(log_id, label_id, &series)?;
        stats.create_or_update_aggregate(log_id, label_id, &aggregate)?;
        stats.create_or_update_histogram(log_id, label_id, &histogram)?;
        stats.create_or_update_percentiles(log_id, label_id, &percentiles)?;
    }

    Ok(())
}
