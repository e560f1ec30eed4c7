use serde::{Serialize, Deserialize};

use super::{FeedbackReport, Submission, Task};

/// Band label shown under the overall score.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BandLabel {
    Good,
    Competent,
    Developing,
}

impl BandLabel {
    pub fn for_score(score: f64) -> Self {
        if score >= 7.0 {
            BandLabel::Good
        } else if score >= 6.0 {
            BandLabel::Competent
        } else {
            BandLabel::Developing
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            BandLabel::Good => "review.good",
            BandLabel::Competent => "review.competent",
            BandLabel::Developing => "review.developing",
        }
    }
}

/// Statistics shown next to a feedback report.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReviewSummary {
    pub word_count: usize,
    pub target_words: u32,
    pub minutes_spent: u64,
    pub time_limit: u32,
    pub word_count_met: bool,
    pub within_time_limit: bool,
    pub band: BandLabel,
}

impl ReviewSummary {
    pub fn new(submission: &Submission, task: &Task, report: &FeedbackReport) -> Self {
        Self {
            word_count: submission.word_count,
            target_words: task.word_limit,
            minutes_spent: (submission.elapsed_seconds + 30) / 60,
            time_limit: task.time_limit,
            word_count_met: submission.word_count >= task.word_limit as usize,
            within_time_limit: submission.elapsed_seconds <= task.time_limit_seconds(),
            band: BandLabel::for_score(report.overall_score),
        }
    }

    pub fn word_count_key(&self) -> &'static str {
        if self.word_count_met { "review.wordCountMet" } else { "review.belowMinimum" }
    }

    pub fn time_limit_key(&self) -> &'static str {
        if self.within_time_limit { "review.withinTimeLimit" } else { "review.exceededTimeLimit" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::{BandScores, Provenance};
    use chrono::Utc;
    use uuid::Uuid;

    fn fixture(word_count: usize, elapsed_seconds: u64, overall: f64) -> (Submission, Task, FeedbackReport) {
        let task = Task {
            id: "p1-charts".to_string(),
            title: "Sales Data Analysis".to_string(),
            description: "Summarize the information.".to_string(),
            time_limit: 20,
            word_limit: 150,
            task_type: "Bar Chart".to_string(),
        };
        let submission = Submission {
            session_id: Uuid::new_v4(),
            task_id: task.id.clone(),
            text: "text".to_string(),
            word_count,
            elapsed_seconds,
            submitted_at: Utc::now(),
        };
        let report = FeedbackReport {
            overall_score: overall,
            scores: BandScores {
                task_response: overall,
                coherence_cohesion: overall,
                lexical_resource: overall,
                grammatical_accuracy: overall,
            },
            strengths: vec![],
            improvements: vec![],
            suggestions: vec![],
            annotations: vec![],
            provenance: Provenance::Service,
        };
        (submission, task, report)
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(BandLabel::for_score(7.0), BandLabel::Good);
        assert_eq!(BandLabel::for_score(6.9), BandLabel::Competent);
        assert_eq!(BandLabel::for_score(5.5), BandLabel::Developing);
    }

    #[test]
    fn test_summary_within_limits() {
        let (submission, task, report) = fixture(160, 1200, 6.5);
        let summary = ReviewSummary::new(&submission, &task, &report);
        assert!(summary.word_count_met);
        assert!(summary.within_time_limit);
        assert_eq!(summary.minutes_spent, 20);
        assert_eq!(summary.band, BandLabel::Competent);
        assert_eq!(summary.word_count_key(), "review.wordCountMet");
    }

    #[test]
    fn test_summary_overrun_and_short() {
        let (submission, task, report) = fixture(90, 1201, 5.0);
        let summary = ReviewSummary::new(&submission, &task, &report);
        assert!(!summary.word_count_met);
        assert!(!summary.within_time_limit);
        assert_eq!(summary.time_limit_key(), "review.exceededTimeLimit");
        assert_eq!(summary.band.key(), "review.developing");
    }
}
