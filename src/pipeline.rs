//! Concurrent dispatch pipeline.
//!
//! Fans the resources of one type out across a bounded worker pool. Each
//! worker runs metadata fetch, comparison and report write independently;
//! per-resource failures are logged and skipped so one flaky cloud call
//! never fails the batch. Only a parse failure is fatal.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::checker::DriftChecker;
use crate::error::DriftwatchError;
use crate::providers::Provider;
use crate::reporter::Reporter;
use crate::state::{StateManager, StateResource};

/// Fixed size of the worker pool. Bounds API quota consumption to at most
/// one in-flight call per worker.
pub const WORKER_COUNT: usize = 5;

/// Counts observed by the caller; per-resource failures are only surfaced
/// through logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectionSummary {
    /// Resources of the requested type found in the state file.
    pub resources: usize,
    /// Reports successfully handed to the reporter.
    pub reports_written: usize,
    /// Written reports that recorded drift.
    pub drifted: usize,
}

#[derive(Default)]
struct Tally {
    reports: AtomicUsize,
    drifted: AtomicUsize,
}

/// Runs the end-to-end detection flow for every resource of `resource_type`
/// in the state file at `state_path`.
///
/// Returns an error only when the state file cannot be parsed; the batch
/// itself never fails because individual resources fail.
#[allow(clippy::too_many_arguments)]
pub async fn run_drift_detection(
    ctx: CancellationToken,
    state_path: &Path,
    resource_type: &str,
    attributes_to_track: &[String],
    state_manager: &dyn StateManager,
    provider: Arc<dyn Provider>,
    checker: Arc<dyn DriftChecker>,
    reporter: Arc<dyn Reporter>,
) -> Result<DetectionSummary, DriftwatchError> {
    run_with_workers(
        ctx,
        state_path,
        resource_type,
        attributes_to_track,
        state_manager,
        provider,
        checker,
        reporter,
        WORKER_COUNT,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn run_with_workers(
    ctx: CancellationToken,
    state_path: &Path,
    resource_type: &str,
    attributes_to_track: &[String],
    state_manager: &dyn StateManager,
    provider: Arc<dyn Provider>,
    checker: Arc<dyn DriftChecker>,
    reporter: Arc<dyn Reporter>,
    workers: usize,
) -> Result<DetectionSummary, DriftwatchError> {
    let content = state_manager.parse_state_file(state_path)?;
    let resources = state_manager.resources_by_type(&content, resource_type);
    if resources.is_empty() {
        tracing::info!(resource_type, "no resources of the requested type in the state file");
        return Ok(DetectionSummary::default());
    }
    let total = resources.len();

    // Channel capacity equals the pool size: the feeder blocks once every
    // worker is busy, which is the only backpressure mechanism.
    let (sender, receiver) = mpsc::channel::<StateResource>(workers);
    let receiver = Arc::new(Mutex::new(receiver));
    let tally = Arc::new(Tally::default());

    let mut pool = JoinSet::new();
    for _ in 0..workers {
        let ctx = ctx.clone();
        let receiver = Arc::clone(&receiver);
        let provider = Arc::clone(&provider);
        let checker = Arc::clone(&checker);
        let reporter = Arc::clone(&reporter);
        let tally = Arc::clone(&tally);
        let resource_type = resource_type.to_string();
        let attributes = attributes_to_track.to_vec();

        pool.spawn(async move {
            loop {
                let resource = {
                    let mut receiver = receiver.lock().await;
                    tokio::select! {
                        _ = ctx.cancelled() => return,
                        next = receiver.recv() => match next {
                            Some(resource) => resource,
                            None => return,
                        },
                    }
                };

                tokio::select! {
                    _ = ctx.cancelled() => return,
                    _ = process_resource(
                        &resource_type,
                        &attributes,
                        provider.as_ref(),
                        checker.as_ref(),
                        reporter.as_ref(),
                        &tally,
                        &resource,
                    ) => {}
                }
            }
        });
    }

    for resource in resources {
        tokio::select! {
            _ = ctx.cancelled() => break,
            sent = sender.send(resource) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    // Closing the feed channel is what lets the pool drain and terminate.
    drop(sender);

    while pool.join_next().await.is_some() {}

    let summary = DetectionSummary {
        resources: total,
        reports_written: tally.reports.load(Ordering::Relaxed),
        drifted: tally.drifted.load(Ordering::Relaxed),
    };
    tracing::info!(
        resources = summary.resources,
        reports = summary.reports_written,
        drifted = summary.drifted,
        "drift detection finished"
    );
    Ok(summary)
}

async fn process_resource(
    resource_type: &str,
    attributes_to_track: &[String],
    provider: &dyn Provider,
    checker: &dyn DriftChecker,
    reporter: &dyn Reporter,
    tally: &Tally,
    resource: &StateResource,
) {
    let resource_id = resource.attribute_value("id").unwrap_or_default();

    let live = match provider.infrastructure_metadata(resource_type, resource).await {
        Ok(live) => live,
        Err(err) => {
            tracing::error!(
                resource_id = %resource_id,
                error = %err,
                "failed to retrieve infrastructure metadata"
            );
            return;
        }
    };

    let report = match checker.compare_states(Some(live.as_ref()), resource, attributes_to_track) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(
                resource_id = %resource_id,
                error = %err,
                "failed to compare desired and live state"
            );
            return;
        }
    };

    if let Err(err) = reporter.write_report(&report).await {
        tracing::error!(resource_id = %resource_id, error = %err, "failed to write drift report");
        return;
    }

    tally.reports.fetch_add(1, Ordering::Relaxed);
    if report.has_drift {
        tally.drifted.fetch_add(1, Ordering::Relaxed);
    }
}
