pub mod client;
pub mod fallback;

pub use client::*;
pub use fallback::*;

use std::sync::Arc;
use async_trait::async_trait;
use log::{info, warn};
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::practice::{FeedbackReport, Provenance, Submission, Task};

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Scoring request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Scoring service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed scoring response: {0}")]
    Malformed(String),
}

/// Body of the POST sent to the scoring service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    pub content: String,
    pub question_id: String,
    pub word_count: usize,
    pub time_spent: u64, // in seconds
    pub question_type: String,
    pub word_limit: u32,
    pub time_limit: u32, // in minutes
}

impl ScoringRequest {
    pub fn new(submission: &Submission, task: &Task) -> Self {
        Self {
            content: submission.text.clone(),
            question_id: submission.task_id.clone(),
            word_count: submission.word_count,
            time_spent: submission.elapsed_seconds,
            question_type: task.task_type.clone(),
            word_limit: task.word_limit,
            time_limit: task.time_limit,
        }
    }
}

#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn score(&self, request: &ScoringRequest) -> Result<FeedbackReport, ScoringError>;
}

/// Sends submissions for scoring and always resolves to a report.
///
/// One attempt per submission. Any failure is logged and answered with a
/// locally synthesized report marked [`Provenance::Fallback`].
pub struct SubmissionGateway {
    service: Arc<dyn ScoringService>,
    fallback: Mutex<FallbackScorer>,
}

impl SubmissionGateway {
    pub fn new(service: Arc<dyn ScoringService>) -> Self {
        Self::with_fallback(service, FallbackScorer::new())
    }

    pub fn with_fallback(service: Arc<dyn ScoringService>, fallback: FallbackScorer) -> Self {
        Self {
            service,
            fallback: Mutex::new(fallback),
        }
    }

    pub async fn submit(&self, submission: &Submission, task: &Task) -> FeedbackReport {
        let request = ScoringRequest::new(submission, task);
        info!(
            "📝 Submitting {} words for task {} ({}s spent)",
            request.word_count, request.question_id, request.time_spent
        );

        match self.service.score(&request).await {
            Ok(mut report) => {
                report.provenance = Provenance::Service;
                info!("✅ Scoring service returned band {}", report.overall_score);
                report
            }
            Err(e) => {
                warn!("⚠️ Scoring service unavailable, using local feedback: {}", e);
                self.fallback.lock().synthesize(submission, task)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    struct Unreachable;

    #[async_trait]
    impl ScoringService for Unreachable {
        async fn score(&self, _request: &ScoringRequest) -> Result<FeedbackReport, ScoringError> {
            Err(ScoringError::Status { status: 503, body: "down".to_string() })
        }
    }

    fn task() -> Task {
        Task {
            id: "p2-problem".to_string(),
            title: "Urban Traffic Solutions".to_string(),
            description: "What are the causes and what solutions can you suggest?".to_string(),
            time_limit: 40,
            word_limit: 250,
            task_type: "Problem/Solution".to_string(),
        }
    }

    fn submission(word_count: usize) -> Submission {
        Submission {
            session_id: Uuid::new_v4(),
            task_id: "p2-problem".to_string(),
            text: "Traffic is a growing problem.".to_string(),
            word_count,
            elapsed_seconds: 1800,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_request_wire_shape() {
        let request = ScoringRequest::new(&submission(260), &task());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["content"], "Traffic is a growing problem.");
        assert_eq!(json["questionId"], "p2-problem");
        assert_eq!(json["wordCount"], 260);
        assert_eq!(json["timeSpent"], 1800);
        assert_eq!(json["questionType"], "Problem/Solution");
        assert_eq!(json["wordLimit"], 250);
        assert_eq!(json["timeLimit"], 40);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let gateway = SubmissionGateway::with_fallback(Arc::new(Unreachable), FallbackScorer::seeded(7));
        let report = gateway.submit(&submission(260), &task()).await;
        assert!(report.is_fallback());
        assert_eq!(report.overall_score, report.scores.overall());
    }
}
