// src/models.rs
use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Pending,
    Processing,
    Submitted,
    Completed,
    Failed,
}

impl VideoStatus {
    /// Completed and failed jobs never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoStatus::Pending => write!(f, "pending"),
            VideoStatus::Processing => write!(f, "processing"),
            VideoStatus::Submitted => write!(f, "submitted"),
            VideoStatus::Completed => write!(f, "completed"),
            VideoStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Last known state of one video-generation job, as returned by `check-video-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: VideoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn new(status: VideoStatus) -> Self {
        Self {
            status,
            video_url: None,
            video_id: None,
            request_id: None,
            progress: None,
            estimated_completion: None,
            error: None,
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Uniform outcome of every remote call.
///
/// On the wire this is the `{ success, data | error, details? }` envelope.
/// Exactly one of `data` or `error` is ever present.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult<T> {
    Success(T),
    Failure {
        error: String,
        details: Option<String>,
    },
}

impl<T> ApiResult<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        ApiResult::Failure {
            error: error.into(),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResult::Success(data) => Some(data),
            ApiResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResult::Success(_) => None,
            ApiResult::Failure { error, .. } => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            ApiResult::Success(data) => ApiResult::Success(f(data)),
            ApiResult::Failure { error, details } => ApiResult::Failure { error, details },
        }
    }
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

#[derive(Deserialize)]
struct EnvelopeIn<T> {
    success: Option<bool>,
    data: Option<T>,
    error: Option<String>,
    details: Option<String>,
}

impl<T: Serialize> Serialize for ApiResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let envelope = match self {
            ApiResult::Success(data) => EnvelopeOut {
                success: true,
                data: Some(data),
                error: None,
                details: None,
            },
            ApiResult::Failure { error, details } => EnvelopeOut {
                success: false,
                data: None,
                error: Some(error.as_str()),
                details: details.as_deref(),
            },
        };
        envelope.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ApiResult<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let envelope = EnvelopeIn::<T>::deserialize(deserializer)?;
        match (envelope.success, envelope.data, envelope.error) {
            (Some(true), Some(data), None) => Ok(ApiResult::Success(data)),
            (Some(false), None, Some(error)) => Ok(ApiResult::Failure {
                error,
                details: envelope.details,
            }),
            _ => Err(de::Error::custom(
                "envelope must carry data with success=true or error with success=false",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStyle {
    Corporate,
    Dynamic,
    Minimalist,
    Cinematic,
    Animated,
}

impl VideoStyle {
    pub const ALL: [VideoStyle; 5] = [
        VideoStyle::Corporate,
        VideoStyle::Dynamic,
        VideoStyle::Minimalist,
        VideoStyle::Cinematic,
        VideoStyle::Animated,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VideoStyle::Corporate => "Corporate",
            VideoStyle::Dynamic => "Dynamic",
            VideoStyle::Minimalist => "Minimalist",
            VideoStyle::Cinematic => "Cinematic",
            VideoStyle::Animated => "Animated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Starter,
    Professional,
    Business,
    Enterprise,
}

/// Customer and product details collected by the video form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub product_name: String,
    pub target_audience: String,
    pub video_style: VideoStyle,
    /// Seconds.
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_colors: Option<Vec<String>>,
    pub key_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
}

/// Body of `POST manage-subscriptions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    pub user_id: String,
    pub tier: SubscriptionTier,
}
