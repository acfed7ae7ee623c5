// src/api/handlers/catalog.rs
use actix_web::{HttpResponse, Result};
use serde::Serialize;

use crate::catalog::{self, FormOptions, PricingTier};
use crate::errors;
use crate::models::ApiResult;

#[derive(Serialize)]
pub struct PricingResponse {
    pub tiers: &'static [PricingTier],
}

/// GET /api/v1/pricing - Static pricing table
pub async fn get_pricing() -> Result<HttpResponse> {
    Ok(pricing_response(catalog::pricing_tiers()))
}

fn pricing_response(tiers: errors::Result<&'static [PricingTier]>) -> HttpResponse {
    match tiers {
        Ok(tiers) => HttpResponse::Ok().json(ApiResult::Success(PricingResponse { tiers })),
        Err(e) => HttpResponse::InternalServerError().json(ApiResult::<PricingResponse>::Failure {
            error: "Pricing is currently unavailable".to_string(),
            details: Some(e.to_string()),
        }),
    }
}

/// GET /api/v1/options - Video styles and durations offered by the form
pub async fn get_options() -> Result<HttpResponse> {
    let options: FormOptions = catalog::form_options();
    Ok(HttpResponse::Ok().json(ApiResult::Success(options)))
}
