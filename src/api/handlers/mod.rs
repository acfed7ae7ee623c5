// src/api/handlers/mod.rs
mod health;
mod catalog;
mod videos;
mod subscriptions;
pub mod ws;

use actix_web::HttpResponse;
use serde::Serialize;

use crate::models::ApiResult;

pub use health::health_check;
pub use catalog::{get_pricing, get_options};
pub use videos::{submit_video, submit_form, get_video_status};
pub use subscriptions::{get_subscription, get_remote_tiers, update_subscription};
pub use ws::{video_ws, ResultViewSocket};

/// Relays an upstream envelope: 200 on success, 502 when the remote API failed.
fn relay<T: Serialize>(result: ApiResult<T>) -> HttpResponse {
    match &result {
        ApiResult::Success(_) => HttpResponse::Ok().json(result),
        ApiResult::Failure { .. } => HttpResponse::BadGateway().json(result),
    }
}
