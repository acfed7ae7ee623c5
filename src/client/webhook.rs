// src/client/webhook.rs

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::time::Instant;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::{FormData, RequestId, VideoStyle};

const SOURCE: &str = "merxman-web";
const SUFFIX_LEN: usize = 9;

#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub request_id: &'a RequestId,
    pub customer: CustomerInfo<'a>,
    pub product: ProductInfo<'a>,
    pub metadata: SubmissionMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub struct CustomerInfo<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ProductInfo<'a> {
    pub name: &'a str,
    pub target_audience: &'a str,
    pub video_style: VideoStyle,
    pub duration: u32,
    pub key_message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_colors: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    pub submitted_at: String,
    pub source: &'static str,
    pub version: &'static str,
}

/// Generates a fresh `mx-<unix millis>-<suffix>` request identifier.
pub fn generate_request_id() -> RequestId {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect();
    RequestId::new(format!("mx-{}-{}", Utc::now().timestamp_millis(), suffix))
}

/// Builds the JSON document the automation webhook expects.
pub fn build_payload<'a>(
    request_id: &'a RequestId,
    form: &'a FormData,
    user_id: Option<&'a str>,
) -> WebhookPayload<'a> {
    WebhookPayload {
        request_id,
        customer: CustomerInfo {
            name: &form.customer_name,
            email: &form.customer_email,
        },
        product: ProductInfo {
            name: &form.product_name,
            target_audience: &form.target_audience,
            video_style: form.video_style,
            duration: form.duration,
            key_message: &form.key_message,
            call_to_action: form.call_to_action.as_deref().filter(|c| !c.is_empty()),
            brand_colors: form.brand_colors.as_deref().filter(|c| !c.is_empty()),
        },
        metadata: SubmissionMetadata {
            user_id,
            submitted_at: Utc::now().to_rfc3339(),
            source: SOURCE,
            version: env!("CARGO_PKG_VERSION"),
        },
    }
}

/// Posts new video orders straight to the automation webhook.
#[derive(Debug, Clone)]
pub struct WebhookSubmitter {
    client: Client,
    url: String,
}

impl WebhookSubmitter {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(client: Client, config: &AppConfig) -> Self {
        Self::new(client, config.webhook_url.clone())
    }

    /// Submits the form and returns the request id to poll on success.
    ///
    /// Any 2xx answer counts as accepted; the response body is not inspected.
    pub async fn submit(&self, form: &FormData, user_id: Option<&str>) -> Result<RequestId> {
        let request_id = generate_request_id();
        let payload = build_payload(&request_id, form, user_id);

        log::info!("📨 Submitting {} to webhook for '{}'", request_id, form.product_name);

        let start = Instant::now();
        let resp = self.client.post(&self.url).json(&payload).send().await?;

        let status = resp.status();
        log::info!(
            "📥 Webhook response status: {} ({}ms)",
            status,
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(AppError::Webhook {
                status: status.as_u16(),
                body,
            });
        }

        Ok(request_id)
    }
}
