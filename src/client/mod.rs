// src/client/mod.rs

use async_trait::async_trait;

use crate::models::{ApiResult, RequestId, StatusResponse};

pub mod api;
pub mod webhook;

pub use api::{ApiClient, RequestOptions};
pub use webhook::WebhookSubmitter;

/// Anything that can report the current status of a generation job.
///
/// The poller only depends on this trait, so sessions can be driven by the
/// real [`ApiClient`] or by an in-memory source in tests.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Performs one status check. Must not retry internally.
    async fn check_video_status(&self, request_id: &RequestId) -> ApiResult<StatusResponse>;
}
