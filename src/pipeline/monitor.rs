// src/pipeline/monitor.rs

//! Per-provider polling loop.
//!
//! Each monitor owns its detector and its document source and runs on its
//! own task: fetch, detect, emit, sleep, repeat. The only suspension points
//! are the fetch and the sleep, and both are raced against shutdown. A
//! panic in the source or the sink fails that cycle only; the loop goes on.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;

use super::shutdown;
use crate::models::Provider;
use crate::output::UpdateSink;
use crate::services::{ChangeDetector, DocumentSource, FetchOutcome};

/// Counters for one monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub cycles: u64,
    pub documents: u64,
    pub unchanged: u64,
    pub failures: u64,
    pub updates_reported: u64,
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A document arrived; this many new updates were emitted
    Reported(usize),
    Unchanged,
    Failed,
}

/// Polling state for one provider.
pub struct ProviderMonitor {
    provider: Provider,
    source: Arc<dyn DocumentSource>,
    sink: Arc<dyn UpdateSink>,
    detector: ChangeDetector,
    stats: MonitorStats,
}

impl ProviderMonitor {
    pub fn new(
        provider: Provider,
        source: Arc<dyn DocumentSource>,
        sink: Arc<dyn UpdateSink>,
    ) -> Self {
        Self {
            provider,
            source,
            sink,
            detector: ChangeDetector::new(),
            stats: MonitorStats::default(),
        }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Run one fetch/detect/emit cycle without sleeping.
    ///
    /// A panic during the cycle is logged and counted as a failure.
    pub async fn poll_once(&mut self) -> CycleOutcome {
        let cycle = async {
            let outcome = self.source.fetch(&self.provider.url).await;
            self.process(outcome)
        };
        let result = AssertUnwindSafe(cycle).catch_unwind().await;

        self.stats.cycles += 1;
        match result {
            Ok(outcome) => outcome,
            Err(payload) => {
                log::error!(
                    "Cycle for {} panicked: {}",
                    self.provider.name,
                    panic_message(&*payload)
                );
                self.stats.failures += 1;
                CycleOutcome::Failed
            }
        }
    }

    /// Poll until shutdown is requested, then return the counters.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> MonitorStats {
        log::info!(
            "Starting monitor for {} (poll every {}s)",
            self.provider.name,
            self.provider.poll_interval.as_secs()
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown::requested(&mut stop) => break,
                _ = self.poll_once() => {}
            }

            tokio::select! {
                biased;
                _ = shutdown::requested(&mut stop) => break,
                _ = tokio::time::sleep(self.provider.poll_interval) => {}
            }
        }

        log::info!(
            "Stopped monitor for {}: {} cycles, {} updates, {} failures",
            self.provider.name,
            self.stats.cycles,
            self.stats.updates_reported,
            self.stats.failures
        );
        self.stats
    }

    fn process(&mut self, outcome: FetchOutcome) -> CycleOutcome {
        match outcome {
            FetchOutcome::Document(document) => {
                self.stats.documents += 1;
                let updates = self.detector.find_new_updates(&document);
                if updates.is_empty() {
                    log::debug!("No new updates from {}", self.provider.name);
                }
                for update in &updates {
                    self.sink.emit(&self.provider.name, update);
                }
                self.stats.updates_reported += updates.len() as u64;
                CycleOutcome::Reported(updates.len())
            }
            FetchOutcome::Unchanged => {
                self.stats.unchanged += 1;
                CycleOutcome::Unchanged
            }
            FetchOutcome::Failed => {
                self.stats.failures += 1;
                CycleOutcome::Failed
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
