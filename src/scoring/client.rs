use std::time::Duration;
use async_trait::async_trait;
use log::{info, error, debug, warn};
use reqwest::Client;
use serde::Deserialize;

use super::{ScoringError, ScoringRequest, ScoringService};
use crate::annotation::Annotation;
use crate::config::ScoringSettings;
use crate::practice::{round_band, BandScores, FeedbackReport, Provenance};

pub const DEFAULT_ENDPOINT: &str = "https://ielts-backend-tl5u.onrender.com/write/review";

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireScores {
    task_response: Option<f64>,
    coherence_cohesion: Option<f64>,
    lexical_resource: Option<f64>,
    grammatical_accuracy: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCorrection {
    original: String,
    simplified: String,
    start_index: usize,
    end_index: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReport {
    overall_score: Option<f64>,
    scores: Option<WireScores>,
    strengths: Option<Vec<String>>,
    improvements: Option<Vec<String>>,
    suggestions: Option<Vec<String>>,
    corrections: Option<Vec<WireCorrection>>,
}

/// Scoring service reached over HTTP with a single JSON POST.
#[derive(Clone)]
pub struct HttpScoringService {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpScoringService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    pub fn from_settings(settings: &ScoringSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("⚠️ Failed to build scoring HTTP client, using defaults without timeouts: {}", e);
                Client::new()
            });

        Self {
            client,
            endpoint: settings.endpoint.clone(),
            auth_token: settings.auth_token.clone(),
        }
    }

    /// Bearer token from the signed-in user, if any.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScoringService for HttpScoringService {
    async fn score(&self, request: &ScoringRequest) -> Result<FeedbackReport, ScoringError> {
        info!("Sending essay to scoring service: {}", self.endpoint);

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("Scoring service error: HTTP {} {}", status, body);
            return Err(ScoringError::Status { status, body });
        }

        let body = response.text().await?;
        debug!("Scoring response: {} bytes", body.len());
        parse_report(&body)
    }
}

/// Parses a scoring response body.
///
/// Missing lists become empty, a missing criterion takes the overall score and
/// a missing overall score is the mean of the criteria present. A body with no
/// score at all is malformed.
pub fn parse_report(body: &str) -> Result<FeedbackReport, ScoringError> {
    let wire: WireReport = serde_json::from_str(body)
        .map_err(|e| ScoringError::Malformed(e.to_string()))?;

    let scores = wire.scores.unwrap_or_default();
    let present: Vec<f64> = [
        scores.task_response,
        scores.coherence_cohesion,
        scores.lexical_resource,
        scores.grammatical_accuracy,
    ]
    .into_iter()
    .flatten()
    .collect();

    let overall = match wire.overall_score {
        Some(score) => round_band(score),
        None if !present.is_empty() => round_band(present.iter().sum::<f64>() / present.len() as f64),
        None => return Err(ScoringError::Malformed("response carries no scores".to_string())),
    };

    let band = |score: Option<f64>| score.map(round_band).unwrap_or(overall);
    let annotations = wire
        .corrections
        .unwrap_or_default()
        .into_iter()
        .map(|c| {
            let end = match c.end_index {
                Some(end) => end,
                None => c.start_index.checked_add(c.original.len()).ok_or_else(|| {
                    ScoringError::Malformed(format!("correction at {} runs past the end of any text", c.start_index))
                })?,
            };
            Ok(Annotation::with_span(c.original, c.simplified, c.start_index, end))
        })
        .collect::<Result<Vec<_>, ScoringError>>()?;

    Ok(FeedbackReport {
        overall_score: overall,
        scores: BandScores {
            task_response: band(scores.task_response),
            coherence_cohesion: band(scores.coherence_cohesion),
            lexical_resource: band(scores.lexical_resource),
            grammatical_accuracy: band(scores.grammatical_accuracy),
        },
        strengths: wire.strengths.unwrap_or_default(),
        improvements: wire.improvements.unwrap_or_default(),
        suggestions: wire.suggestions.unwrap_or_default(),
        annotations,
        provenance: Provenance::Service,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_report() {
        let body = r#"{
            "overallScore": 6.5,
            "scores": {
                "taskResponse": 6.0,
                "coherenceCohesion": 7.0,
                "lexicalResource": 6.5,
                "grammaticalAccuracy": 6.5
            },
            "strengths": ["Clear position"],
            "improvements": ["More examples"],
            "suggestions": ["Plan before writing"],
            "corrections": [
                {"original": "in order to", "simplified": "to", "startIndex": 26, "endIndex": 37}
            ]
        }"#;

        let report = parse_report(body).unwrap();
        assert_eq!(report.overall_score, 6.5);
        assert_eq!(report.scores.coherence_cohesion, 7.0);
        assert_eq!(report.strengths, vec!["Clear position".to_string()]);
        assert_eq!(report.annotations.len(), 1);
        assert_eq!(report.annotations[0].end(), 37);
        assert_eq!(report.provenance, Provenance::Service);
    }

    #[test]
    fn test_parse_partial_report() {
        let report = parse_report(r#"{"overallScore": 7.0, "scores": {"taskResponse": 6.5}}"#).unwrap();
        assert_eq!(report.scores.task_response, 6.5);
        assert_eq!(report.scores.lexical_resource, 7.0);
        assert!(report.strengths.is_empty());
        assert!(report.annotations.is_empty());

        let report = parse_report(r#"{"scores": {"taskResponse": 6.0, "lexicalResource": 7.0}, "strengths": null}"#).unwrap();
        assert_eq!(report.overall_score, 6.5);
        assert_eq!(report.scores.grammatical_accuracy, 6.5);
    }

    #[test]
    fn test_correction_end_derived() {
        let report = parse_report(
            r#"{"overallScore": 6.0, "corrections": [{"original": "a lot of", "simplified": "many", "startIndex": 4}]}"#,
        )
        .unwrap();
        assert_eq!(report.annotations[0].end(), 12);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(parse_report("not json"), Err(ScoringError::Malformed(_))));
        assert!(matches!(parse_report("[]"), Err(ScoringError::Malformed(_))));
        assert!(matches!(parse_report(r#"{"strengths": []}"#), Err(ScoringError::Malformed(_))));
    }

    #[test]
    fn test_correction_offset_overflow_is_malformed() {
        let body = r#"{"overallScore": 6.0, "corrections": [{"original": "in order to", "simplified": "to", "startIndex": 18446744073709551615}]}"#;
        assert!(matches!(parse_report(body), Err(ScoringError::Malformed(_))));
    }

    #[test]
    fn test_from_settings_keeps_endpoint_and_token() {
        let settings = ScoringSettings {
            endpoint: "http://127.0.0.1:9000/review".to_string(),
            timeout_secs: 1,
            connect_timeout_secs: 1,
            auth_token: Some("secret".to_string()),
        };
        let service = HttpScoringService::from_settings(&settings);
        assert_eq!(service.endpoint(), "http://127.0.0.1:9000/review");
        assert_eq!(service.auth_token.as_deref(), Some("secret"));
    }
}
