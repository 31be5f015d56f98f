//! Trait abstraction over the SecurityHub remote API.
//!
//! This module provides the [`SecurityApi`] trait that abstracts over the real
//! HTTP client and the mock API used for testing and demos.

use async_trait::async_trait;

use securityhub_types::{Mode, SensorKey};

use crate::client::{CommandAck, FetchedSnapshot, LoginResponse};
use crate::error::Result;

/// Trait abstracting the remote API.
///
/// # Example
///
/// ```ignore
/// use securityhub_core::{SecurityApi, Result};
///
/// async fn sensor_count<A: SecurityApi>(api: &A, token: &str) -> Result<usize> {
///     Ok(api.fetch_status("1", token).await?.snapshot.len())
/// }
/// ```
#[async_trait]
pub trait SecurityApi: Send + Sync {
    /// Exchange credentials for a session token.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;

    /// Read the current sensor values of a site, timing the request.
    async fn fetch_status(&self, site_id: &str, token: &str) -> Result<FetchedSnapshot>;

    /// Ask the server to switch a site's arming mode.
    async fn set_mode(&self, site_id: &str, token: &str, mode: Mode) -> Result<CommandAck>;

    /// Ask the server to enable or disable a sensor.
    async fn set_sensor(
        &self,
        site_id: &str,
        token: &str,
        sensor: &SensorKey,
        enabled: bool,
    ) -> Result<CommandAck>;
}
