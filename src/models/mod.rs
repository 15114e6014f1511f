// src/models/mod.rs

//! Domain models for the tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod document;
mod provider;
mod update;

// Re-export all public types
pub use config::{Config, OutputConfig, OutputFormat, ProviderConfig, TrackerConfig};
pub use document::{ComponentEntry, IncidentEntry, IncidentsDocument, UpdateEntry};
pub use provider::Provider;
pub use update::{IncidentUpdate, UpdateKey};
