//! Timed IELTS writing practice: task catalog, countdown timer, live word
//! count, a submit/review session flow, remote scoring with local fallback,
//! and toggleable simplification suggestions over the submitted essay.

pub mod annotation;
pub mod config;
pub mod i18n;
pub mod identity;
pub mod practice;
pub mod question_bank;
pub mod scoring;
pub mod session;

pub use annotation::{AnnotatedText, Annotation, AnnotationError};
pub use config::Settings;
pub use question_bank::QuestionBank;
pub use scoring::{HttpScoringService, ScoringService, SubmissionGateway};
pub use session::{PracticeSession, SessionError, SessionEvent, Stage, WritingController};

/// Initializes `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
