// src/api/handlers/videos.rs
use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::api::AppState;
use crate::errors::AppError;
use crate::models::{ApiResult, FormData, RequestId};
use super::relay;

#[derive(Serialize)]
pub struct SubmissionAccepted {
    pub request_id: RequestId,
}

/// POST /api/v1/videos - Hand a new order to the automation webhook
pub async fn submit_video(
    state: web::Data<AppState>,
    req: web::Json<FormData>,
) -> Result<HttpResponse> {
    let form = req.into_inner();
    let user_id = state.config.resolve_user(form.user_id.as_deref());

    match state.webhook.submit(&form, user_id).await {
        Ok(request_id) => {
            log::info!("✅ Webhook accepted {}", request_id);
            Ok(HttpResponse::Accepted().json(ApiResult::Success(SubmissionAccepted { request_id })))
        }
        Err(e) => {
            log::error!("Video submission failed: {}", e);
            let details = match &e {
                AppError::Webhook { body, .. } if !body.is_empty() => Some(body.clone()),
                _ => None,
            };
            let result: ApiResult<SubmissionAccepted> = ApiResult::Failure {
                error: "Submission failed. Please try again.".to_string(),
                details,
            };
            Ok(HttpResponse::BadGateway().json(result))
        }
    }
}

/// POST /api/v1/forms - Forward the form to the functions API
pub async fn submit_form(
    state: web::Data<AppState>,
    req: web::Json<FormData>,
) -> Result<HttpResponse> {
    let mut form = req.into_inner();
    if form.user_id.is_none() {
        form.user_id = state.config.default_user_id.clone();
    }

    Ok(relay(state.api.submit_form(&form).await))
}

/// GET /api/v1/videos/{request_id}/status - One status check, no polling
pub async fn get_video_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let request_id = RequestId::new(path.into_inner());
    Ok(relay(state.api.check_video_status(&request_id).await))
}
