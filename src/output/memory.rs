//! In-memory sink.

use std::sync::{Mutex, PoisonError};

use super::UpdateSink;
use crate::models::IncidentUpdate;

/// Keeps every emitted update, tagged with its provider.
#[derive(Debug, Default)]
pub struct MemorySink {
    updates: Mutex<Vec<(String, IncidentUpdate)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of updates emitted so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return everything emitted so far.
    pub fn take(&self) -> Vec<(String, IncidentUpdate)> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, IncidentUpdate)>> {
        self.updates.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UpdateSink for MemorySink {
    fn emit(&self, provider: &str, update: &IncidentUpdate) {
        self.lock().push((provider.to_string(), update.clone()));
    }
}
