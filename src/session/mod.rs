pub mod events;
pub mod machine;
pub mod controller;

pub use events::*;
pub use machine::*;
pub use controller::*;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::annotation::AnnotationError;

/// Identifies one scoring request; responses for any other id are stale.
pub type RequestId = u64;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    TaskSelection,
    Writing,
    Review,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Nothing to submit: the draft is empty")]
    EmptyDraft,
    #[error("Cannot {operation} during {stage:?}")]
    OutOfSequence { operation: &'static str, stage: Stage },
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
}

impl SessionError {
    /// Errors caused by what the user typed rather than by a caller bug.
    pub fn is_user_error(&self) -> bool {
        matches!(self, SessionError::EmptyDraft)
    }
}
