// src/lib.rs

//! Status page tracker library.
//!
//! Polls status page incident feeds with conditional requests and reports
//! each incident update exactly once per provider.

pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod services;
pub mod utils;
