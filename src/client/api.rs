// src/client/api.rs

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;

use crate::client::StatusSource;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{ApiResult, FormData, RequestId, StatusResponse, SubscriptionTier, SubscriptionUpdate};

const FORM_SUBMISSION: &str = "handle-form-submission";
const VIDEO_STATUS: &str = "check-video-status";
const SUBSCRIPTIONS: &str = "manage-subscriptions";

/// Used when a failed response carries no message of its own.
pub const FALLBACK_ERROR: &str = "Request failed";

/// Method, query string and JSON body of one API call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Client for the remote functions API.
///
/// Every call is a single attempt: no retries, no timeout beyond the
/// transport's own, no caching. Failures of any kind come back as
/// [`ApiResult::Failure`] rather than as an `Err`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(client: Client, config: &AppConfig) -> Self {
        Self::new(client, config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one HTTP call against `endpoint` and normalizes the outcome.
    pub async fn request<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> ApiResult<T> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );

        log::debug!("📡 {} {}", options.method, url);

        let mut builder = self
            .client
            .request(options.method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let start = Instant::now();

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::warn!("Request to {} failed: {}", url, e);
                return ApiResult::failure(AppError::Request(e).to_string());
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Could not read response body from {}: {}", url, e);
                return ApiResult::failure(AppError::Request(e).to_string());
            }
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        log::debug!("📥 {} {} -> {} ({}ms)", options.method, url, status, latency_ms);

        interpret_response(status, &body)
    }

    pub async fn submit_form(&self, form: &FormData) -> ApiResult<Value> {
        let body = match serde_json::to_value(form) {
            Ok(body) => body,
            Err(e) => return ApiResult::failure(AppError::JsonParse(e).to_string()),
        };
        self.request(FORM_SUBMISSION, RequestOptions::post(body)).await
    }

    pub async fn check_video_status(&self, request_id: &RequestId) -> ApiResult<StatusResponse> {
        self.request(
            VIDEO_STATUS,
            RequestOptions::get().with_query("request_id", request_id.as_str()),
        )
        .await
    }

    pub async fn get_subscription(&self, user_id: &str) -> ApiResult<Value> {
        self.request(SUBSCRIPTIONS, RequestOptions::get().with_query("user_id", user_id))
            .await
    }

    pub async fn get_pricing_tiers(&self) -> ApiResult<Value> {
        self.request(SUBSCRIPTIONS, RequestOptions::get().with_query("action", "tiers"))
            .await
    }

    pub async fn update_subscription(&self, user_id: &str, tier: SubscriptionTier) -> ApiResult<Value> {
        let update = SubscriptionUpdate {
            user_id: user_id.to_string(),
            tier,
        };
        let body = match serde_json::to_value(&update) {
            Ok(body) => body,
            Err(e) => return ApiResult::failure(AppError::JsonParse(e).to_string()),
        };
        self.request(SUBSCRIPTIONS, RequestOptions::post(body)).await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn check_video_status(&self, request_id: &RequestId) -> ApiResult<StatusResponse> {
        ApiClient::check_video_status(self, request_id).await
    }
}

/// Maps an HTTP status and raw body onto the envelope.
fn interpret_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResult<T> {
    // An empty body is a parse error like any other non-JSON body.
    let parsed: Result<Value, serde_json::Error> = serde_json::from_str(body);

    if !status.is_success() {
        // Non-JSON error pages still fall back to the generic message.
        let value = parsed.unwrap_or(Value::Null);
        return server_failure(&value);
    }

    let value = match parsed {
        Ok(value) => value,
        Err(e) => return ApiResult::failure(AppError::JsonParse(e).to_string()),
    };

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return server_failure(&value);
    }

    match serde_json::from_value::<T>(value) {
        Ok(data) => ApiResult::Success(data),
        Err(e) => ApiResult::failure(AppError::UnexpectedResponse(e.to_string()).to_string()),
    }
}

fn server_failure<T>(value: &Value) -> ApiResult<T> {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .unwrap_or(FALLBACK_ERROR)
        .to_string();

    let details = value.get("details").and_then(|d| match d {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });

    ApiResult::Failure { error, details }
}
