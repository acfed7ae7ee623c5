// src/api/handlers/subscriptions.rs
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use crate::api::AppState;
use crate::models::{ApiResult, SubscriptionTier};
use super::relay;

#[derive(Deserialize)]
pub struct SubscriptionQuery {
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub user_id: Option<String>,
    pub tier: SubscriptionTier,
}

fn missing_user() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResult::<()>::failure(
        "user_id is required when no default user is configured",
    ))
}

/// GET /api/v1/subscriptions?user_id= - Current subscription of a user
pub async fn get_subscription(
    state: web::Data<AppState>,
    query: web::Query<SubscriptionQuery>,
) -> Result<HttpResponse> {
    let Some(user_id) = state.config.resolve_user(query.user_id.as_deref()) else {
        return Ok(missing_user());
    };

    Ok(relay(state.api.get_subscription(user_id).await))
}

/// GET /api/v1/subscriptions/tiers - Tiers as published by the functions API
pub async fn get_remote_tiers(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(relay(state.api.get_pricing_tiers().await))
}

/// POST /api/v1/subscriptions - Move a user to another tier
pub async fn update_subscription(
    state: web::Data<AppState>,
    req: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let Some(user_id) = state.config.resolve_user(req.user_id.as_deref()) else {
        return Ok(missing_user());
    };

    log::info!("Updating subscription of {} to {:?}", user_id, req.tier);
    Ok(relay(state.api.update_subscription(user_id, req.tier).await))
}
