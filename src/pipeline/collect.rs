// src/pipeline/collect.rs

//! Collection run across all configured states.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;
use crate::models::{MarathonRecord, Pacing, RunStats, UsState};
use crate::services::StateCollector;
use crate::storage::{RecordStorage, WriteSummary};
use crate::utils::report;

/// Cooperative stop signal, checked between states.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records gathered by a run, with its counters.
#[derive(Debug)]
pub struct CollectionOutcome {
    pub records: Vec<MarathonRecord>,
    pub stats: RunStats,
}

/// Collect every state in order.
///
/// A state whose listing cannot be fetched contributes no records; the run
/// moves on to the next state. Cancellation takes effect before the next
/// state starts, keeping everything collected so far.
pub async fn collect_states(
    collector: &StateCollector<'_>,
    states: &[UsState],
    cancel: &CancelToken,
) -> CollectionOutcome {
    let mut stats = RunStats::start(states.len());
    let mut records = Vec::new();

    for (index, state) in states.iter().enumerate() {
        if cancel.is_cancelled() {
            log::warn!(
                "Cancelled after {} of {} states",
                stats.states_completed + stats.states_failed,
                states.len()
            );
            stats.cancelled = true;
            break;
        }

        if index > 0 {
            Pacing::wait(collector.pacing().state_delay).await;
        }

        report::step(
            index + 1,
            states.len(),
            &format!("Processing {} ({})", state.name, state.code),
        );
        match collector.collect(state).await {
            Ok(outcome) => {
                stats.states_completed += 1;
                stats.candidates_found += outcome.candidates_found;
                stats.detail_failures += outcome.detail_failures;
                records.extend(outcome.records);
            }
            Err(error) => {
                stats.states_failed += 1;
                log::warn!("  Error processing {}: {}", state.name, error);
            }
        }
    }

    stats.records = records.len();
    stats.finish();
    CollectionOutcome { records, stats }
}

/// Collect all states and persist the records.
///
/// Output is written even when states failed or the run was cancelled.
pub async fn run_collection(
    collector: &StateCollector<'_>,
    states: &[UsState],
    storage: &dyn RecordStorage,
    cancel: &CancelToken,
) -> Result<(RunStats, WriteSummary)> {
    report::header("Marathon collection starting");
    log::info!("Processing {} states", states.len());

    let outcome = collect_states(collector, states, cancel).await;
    let summary = storage
        .write_records(&outcome.records, &outcome.stats)
        .await?;

    let stats = outcome.stats;
    report::separator();
    report::summary(
        "Collection complete",
        &[
            ("States completed", stats.states_completed.to_string()),
            ("States failed", stats.states_failed.to_string()),
            ("Races found", stats.candidates_found.to_string()),
            ("Records written", summary.record_count.to_string()),
            ("Elevation fetch failures", stats.detail_failures.to_string()),
            ("Elapsed (s)", stats.elapsed_secs().to_string()),
            ("Output", summary.location.clone()),
            ("Written at", summary.timestamp.to_rfc3339()),
        ],
    );

    Ok((stats, summary))
}
