// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::TrackerConfig;

/// Create the asynchronous HTTP client shared by every provider.
///
/// The client owns the connection pool; cloning it is cheap and all clones
/// share the same pool.
pub fn create_async_client(config: &TrackerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .build()?;
    Ok(client)
}
