use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::practice::{round_band, BandScores, FeedbackReport, Provenance, Submission, Task};

// Placeholder rubric: sub-scores land in a middling band and task response
// drops when the length is far from the target.
const BASE_LOW: f64 = 6.0;
const BASE_HIGH: f64 = 8.0;
const SHORT_RATIO: f64 = 0.8;
const SHORT_PENALTY: f64 = 1.0;
const LONG_RATIO: f64 = 2.0;
const LONG_PENALTY: f64 = 0.5;

/// Synthesizes feedback locally when the scoring service cannot be reached.
pub struct FallbackScorer {
    rng: StdRng,
}

impl FallbackScorer {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Same seed, same sequence of reports.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn synthesize(&mut self, submission: &Submission, task: &Task) -> FeedbackReport {
        let mut scores = BandScores {
            task_response: self.draw(),
            coherence_cohesion: self.draw(),
            lexical_resource: self.draw(),
            grammatical_accuracy: self.draw(),
        };

        let words = submission.word_count as f64;
        let target = f64::from(task.word_limit);
        if words < target * SHORT_RATIO {
            scores.task_response = round_band(scores.task_response - SHORT_PENALTY);
        }
        if words > target * LONG_RATIO {
            scores.task_response = round_band(scores.task_response - LONG_PENALTY);
        }

        debug!("Synthesized fallback scores for {}: {:?}", task.id, scores);

        FeedbackReport {
            overall_score: scores.overall(),
            scores,
            strengths: to_strings(&[
                "Clear structure with good paragraph organization",
                "Appropriate use of linking words and transitions",
                "Good range of vocabulary related to the topic",
                "Generally accurate grammar usage",
            ]),
            improvements: to_strings(&[
                "Could benefit from more specific examples to support arguments",
                "Some sentences could be more concise and direct",
                "Consider using more sophisticated vocabulary where appropriate",
                "Minor grammatical errors that could be avoided with proofreading",
            ]),
            suggestions: to_strings(&[
                "Practice writing topic sentences that clearly introduce main ideas",
                "Work on paraphrasing skills to avoid repetition",
                "Read more academic texts to improve vocabulary range",
                "Always leave time for proofreading and editing",
            ]),
            annotations: Vec::new(),
            provenance: Provenance::Fallback,
        }
    }

    fn draw(&mut self) -> f64 {
        round_band(self.rng.gen_range(BASE_LOW..BASE_HIGH))
    }
}

impl Default for FallbackScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
