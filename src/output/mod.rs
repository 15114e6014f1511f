//! Sinks for reported updates.
//!
//! The monitor loop calls [`UpdateSink::emit`] once per new update, in
//! detection order, on the provider's own task. Implementations must return
//! promptly and handle their own failures.

mod console;
mod memory;

use std::sync::Arc;

pub use console::{ConsoleSink, render_json, render_text};
pub use memory::MemorySink;

use crate::models::{IncidentUpdate, OutputFormat};

/// Consumer of newly detected updates.
pub trait UpdateSink: Send + Sync {
    fn emit(&self, provider: &str, update: &IncidentUpdate);
}

/// Build the stdout sink for the configured format.
pub fn sink_for(format: OutputFormat) -> Arc<dyn UpdateSink> {
    Arc::new(ConsoleSink::new(format))
}
