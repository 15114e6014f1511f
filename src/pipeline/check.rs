// src/pipeline/check.rs

//! One-shot check: poll every provider once and report what is there.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::monitor::{CycleOutcome, ProviderMonitor};
use super::tracker::build_monitors;
use crate::error::Result;
use crate::models::Config;
use crate::output::UpdateSink;

/// Poll each configured provider once, at most `tracker.max_concurrent` at a
/// time. Every update in the current documents is emitted, since the
/// detectors start empty.
pub async fn run_check(
    config: &Config,
    sink: Arc<dyn UpdateSink>,
) -> Result<Vec<(String, CycleOutcome)>> {
    config.validate()?;
    let monitors = build_monitors(config, sink)?;
    Ok(check_monitors(monitors, config.tracker.max_concurrent).await)
}

/// Run one cycle of each monitor, returning outcomes in completion order.
pub async fn check_monitors(
    monitors: Vec<ProviderMonitor>,
    concurrency: usize,
) -> Vec<(String, CycleOutcome)> {
    stream::iter(monitors)
        .map(|mut monitor| async move {
            let outcome = monitor.poll_once().await;
            (monitor.provider().name.clone(), outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}
