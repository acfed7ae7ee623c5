// src/view.rs

use serde::Serialize;

use crate::models::VideoStatus;
use crate::polling::{PollPhase, PollSnapshot};

const JOB_FAILED_FALLBACK: &str = "Video creation failed. Please try again.";
const CHECK_ERROR_FALLBACK: &str = "Error while checking status";

/// Render-ready description of a result view, pushed to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub request_id: String,
    pub phase: PollPhase,
    pub status: Option<VideoStatus>,
    pub headline: String,
    pub message: Option<String>,
    /// Only set when the job reported progress above zero.
    pub progress: Option<u8>,
    pub estimated_completion: Option<String>,
    pub video_url: Option<String>,
    pub download_name: Option<String>,
    /// The user may re-submit the form.
    pub retry_offered: bool,
    pub polling: bool,
}

impl StatusView {
    pub fn from_snapshot(snapshot: &PollSnapshot) -> Self {
        let status = snapshot.status.as_ref();
        let request_id = snapshot.request_id.to_string();

        let headline = match snapshot.phase {
            PollPhase::Errored | PollPhase::TimedOut => "Could not check status".to_string(),
            _ => headline(status.map(|s| s.status)).to_string(),
        };

        let message = match snapshot.phase {
            PollPhase::Errored | PollPhase::TimedOut => Some(
                snapshot
                    .error
                    .clone()
                    .unwrap_or_else(|| CHECK_ERROR_FALLBACK.to_string()),
            ),
            PollPhase::Failed => Some(
                status
                    .and_then(|s| s.error.clone())
                    .unwrap_or_else(|| JOB_FAILED_FALLBACK.to_string()),
            ),
            PollPhase::Idle | PollPhase::Checking | PollPhase::Completed => None,
        };

        let completed = snapshot.phase == PollPhase::Completed;
        let video_url = status
            .filter(|_| completed)
            .and_then(|s| s.video_url.clone());
        let download_name = video_url
            .as_ref()
            .map(|_| format!("merxman-video-{}.mp4", request_id));

        StatusView {
            phase: snapshot.phase,
            status: status.map(|s| s.status),
            headline,
            message,
            progress: status
                .and_then(|s| s.progress)
                .filter(|p| *p > 0)
                .map(|p| p.min(100)),
            estimated_completion: status
                .and_then(|s| s.estimated_completion)
                .map(|at| format!("Estimated completion: {}", at.format("%H:%M:%S UTC"))),
            video_url,
            download_name,
            retry_offered: snapshot.phase == PollPhase::Failed,
            polling: !snapshot.is_stopped(),
            request_id,
        }
    }
}

fn headline(status: Option<VideoStatus>) -> &'static str {
    match status {
        None => "Checking status...",
        Some(VideoStatus::Pending) => "Waiting for processing...",
        Some(VideoStatus::Submitted) => "Job received...",
        Some(VideoStatus::Processing) => "Creating video...",
        Some(VideoStatus::Completed) => "Video ready!",
        Some(VideoStatus::Failed) => "Video creation failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RequestId, StatusResponse};
    use chrono::{TimeZone, Utc};

    fn snapshot(phase: PollPhase, status: Option<StatusResponse>) -> PollSnapshot {
        PollSnapshot {
            request_id: RequestId::new("mx-1-view"),
            phase,
            status,
            error: None,
            attempts: 1,
        }
    }

    #[test]
    fn test_checking_without_status() {
        let view = StatusView::from_snapshot(&snapshot(PollPhase::Checking, None));
        assert_eq!(view.headline, "Checking status...");
        assert!(view.polling);
        assert!(view.progress.is_none());
    }

    #[test]
    fn test_zero_progress_hidden() {
        let view = StatusView::from_snapshot(&snapshot(
            PollPhase::Checking,
            Some(StatusResponse::new(VideoStatus::Processing).with_progress(0)),
        ));
        assert_eq!(view.headline, "Creating video...");
        assert!(view.progress.is_none());

        let view = StatusView::from_snapshot(&snapshot(
            PollPhase::Checking,
            Some(StatusResponse::new(VideoStatus::Processing).with_progress(40)),
        ));
        assert_eq!(view.progress, Some(40));
    }

    #[test]
    fn test_estimated_completion_formatted() {
        let mut status = StatusResponse::new(VideoStatus::Submitted);
        status.estimated_completion = Some(Utc.with_ymd_and_hms(2026, 10, 18, 14, 5, 9).unwrap());

        let view = StatusView::from_snapshot(&snapshot(PollPhase::Checking, Some(status)));
        assert_eq!(
            view.estimated_completion.as_deref(),
            Some("Estimated completion: 14:05:09 UTC")
        );
    }

    #[test]
    fn test_completed_exposes_download() {
        let view = StatusView::from_snapshot(&snapshot(
            PollPhase::Completed,
            Some(StatusResponse::new(VideoStatus::Completed).with_video_url("https://x/y.mp4")),
        ));
        assert_eq!(view.headline, "Video ready!");
        assert_eq!(view.video_url.as_deref(), Some("https://x/y.mp4"));
        assert_eq!(view.download_name.as_deref(), Some("merxman-video-mx-1-view.mp4"));
        assert!(!view.polling);
        assert!(!view.retry_offered);
    }

    #[test]
    fn test_failed_job_offers_retry() {
        let view = StatusView::from_snapshot(&snapshot(
            PollPhase::Failed,
            Some(StatusResponse::new(VideoStatus::Failed)),
        ));
        assert_eq!(view.message.as_deref(), Some(JOB_FAILED_FALLBACK));
        assert!(view.retry_offered);

        let view = StatusView::from_snapshot(&snapshot(
            PollPhase::Failed,
            Some(StatusResponse::new(VideoStatus::Failed).with_error("prompt rejected")),
        ));
        assert_eq!(view.message.as_deref(), Some("prompt rejected"));
    }

    #[test]
    fn test_check_error_is_not_a_job_failure() {
        let mut errored = snapshot(PollPhase::Errored, None);
        errored.error = Some("network down".to_string());

        let view = StatusView::from_snapshot(&errored);
        assert_eq!(view.headline, "Could not check status");
        assert_eq!(view.message.as_deref(), Some("network down"));
        assert!(!view.retry_offered);
        assert!(!view.polling);
    }
}
