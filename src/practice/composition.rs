use serde::{Serialize, Deserialize};

/// Number of whitespace-delimited words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn is_threshold_met(text: &str, minimum: u32) -> bool {
    word_count(text) >= minimum as usize
}

/// Words still missing before `minimum` is reached.
pub fn words_needed(text: &str, minimum: u32) -> usize {
    (minimum as usize).saturating_sub(word_count(text))
}

/// Word-count status of a draft against its task's minimum.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Composition {
    pub word_count: usize,
    pub threshold_met: bool,
    pub words_needed: usize,
}

impl Composition {
    pub fn measure(text: &str, minimum: u32) -> Self {
        let word_count = word_count(text);
        Self {
            word_count,
            threshold_met: word_count >= minimum as usize,
            words_needed: (minimum as usize).saturating_sub(word_count),
        }
    }
}
