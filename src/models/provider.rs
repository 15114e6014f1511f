//! Runtime provider definition.

use std::time::Duration;

/// One status page polled on its own task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    /// Display name used when reporting updates
    pub name: String,

    /// Incidents JSON endpoint
    pub url: String,

    /// Delay between the end of one cycle and the start of the next
    pub poll_interval: Duration,
}

impl Provider {
    pub fn new(name: impl Into<String>, url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            poll_interval,
        }
    }
}
