use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::annotation::Annotation;

pub const BAND_MIN: f64 = 0.0;
pub const BAND_MAX: f64 = 9.0;

/// Frozen copy of a writing session at the moment it was submitted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Submission {
    pub session_id: Uuid,
    pub task_id: String,
    pub text: String,
    pub word_count: usize,
    pub elapsed_seconds: u64, // in seconds
    pub submitted_at: DateTime<Utc>,
}

/// Where a feedback report came from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Service,
    Fallback,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BandScores {
    pub task_response: f64,
    pub coherence_cohesion: f64,
    pub lexical_resource: f64,
    pub grammatical_accuracy: f64,
}

impl BandScores {
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.task_response,
            self.coherence_cohesion,
            self.lexical_resource,
            self.grammatical_accuracy,
        ]
    }

    /// Mean of the four criteria, rounded to one decimal.
    pub fn overall(&self) -> f64 {
        round_band(self.as_array().iter().sum::<f64>() / 4.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FeedbackReport {
    pub overall_score: f64,
    pub scores: BandScores,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub provenance: Provenance,
}

impl FeedbackReport {
    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Rounds to one decimal place and clamps into the band range.
pub fn round_band(score: f64) -> f64 {
    ((score * 10.0).round() / 10.0).clamp(BAND_MIN, BAND_MAX)
}
