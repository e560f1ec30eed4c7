//! Span-level replacement suggestions over a submitted text.
//!
//! The scoring service may return suggestions such as `in order to` → `to`.
//! [`AnnotatedText`] splits the text into literal runs and one toggleable
//! segment per suggestion, each flipping independently between the original
//! wording and the suggested one.
//!
//! Offsets are byte offsets into the UTF-8 text and must fall on character
//! boundaries.

use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("annotation {index} spans {start}..{end} but the text is {len} bytes long")]
    OutOfBounds { index: usize, start: usize, end: usize, len: usize },
    #[error("annotation {index} spans {start}..{end}, which splits a character")]
    NotCharBoundary { index: usize, start: usize, end: usize },
    #[error("annotation {index} starts at {start}, before the previous annotation ends at {previous_end}")]
    Overlap { index: usize, start: usize, previous_end: usize },
    #[error("annotation {index} expects {expected:?} at {start} but the text has {found:?}")]
    Mismatch { index: usize, start: usize, expected: String, found: String },
    #[error("no annotation at index {0}")]
    UnknownAnnotation(usize),
}

/// One original/replacement pair over a half-open span of the base text.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    original: String,
    #[serde(rename = "simplified")]
    replacement: String,
    #[serde(rename = "startIndex")]
    start: usize,
    #[serde(rename = "endIndex")]
    end: usize,
}

impl Annotation {
    /// Span end is derived from the length of `original`. A span that would
    /// run past `usize::MAX` saturates and is later rejected as out of bounds.
    pub fn new(original: impl Into<String>, replacement: impl Into<String>, start: usize) -> Self {
        let original = original.into();
        let end = start.saturating_add(original.len());
        Self { original, replacement: replacement.into(), start, end }
    }

    pub fn with_span(original: impl Into<String>, replacement: impl Into<String>, start: usize, end: usize) -> Self {
        Self { original: original.into(), replacement: replacement.into(), start, end }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Literal { start: usize, end: usize },
    Toggle { annotation: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Literal,
    Toggle { annotation: usize, showing_replacement: bool },
}

/// A segment as it should currently be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub kind: SegmentKind,
}

/// A text split into literal runs and independently toggleable suggestions.
#[derive(Debug, Clone)]
pub struct AnnotatedText {
    text: String,
    annotations: Vec<Annotation>,
    showing_replacement: Vec<bool>,
    pieces: Vec<Piece>,
}

impl AnnotatedText {
    /// Sorts the annotations by start offset (ties keep input order) and
    /// segments `text` around them. Error indices refer to the input order.
    pub fn render(text: impl Into<String>, annotations: Vec<Annotation>) -> Result<Self, AnnotationError> {
        let text = text.into();
        let mut order: Vec<usize> = (0..annotations.len()).collect();
        order.sort_by_key(|&i| annotations[i].start);

        let mut pieces = Vec::with_capacity(annotations.len() * 2 + 1);
        let mut cursor = 0;
        for (position, &index) in order.iter().enumerate() {
            let annotation = &annotations[index];
            let (start, end) = (annotation.start, annotation.end);

            if start > end || end > text.len() {
                return Err(AnnotationError::OutOfBounds { index, start, end, len: text.len() });
            }
            if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
                return Err(AnnotationError::NotCharBoundary { index, start, end });
            }
            if start < cursor {
                return Err(AnnotationError::Overlap { index, start, previous_end: cursor });
            }
            let found = &text[start..end];
            if found != annotation.original {
                return Err(AnnotationError::Mismatch {
                    index,
                    start,
                    expected: annotation.original.clone(),
                    found: found.to_string(),
                });
            }

            if start > cursor {
                pieces.push(Piece::Literal { start: cursor, end: start });
            }
            pieces.push(Piece::Toggle { annotation: position });
            cursor = end;
        }
        if cursor < text.len() {
            pieces.push(Piece::Literal { start: cursor, end: text.len() });
        }

        let mut slots: Vec<Option<Annotation>> = annotations.into_iter().map(Some).collect();
        let sorted: Vec<Annotation> = order.iter().filter_map(|&i| slots[i].take()).collect();

        Ok(Self {
            showing_replacement: vec![false; sorted.len()],
            annotations: sorted,
            pieces,
            text,
        })
    }

    /// The whole text as a single literal segment.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let pieces = if text.is_empty() {
            Vec::new()
        } else {
            vec![Piece::Literal { start: 0, end: text.len() }]
        };
        Self { text, annotations: Vec::new(), showing_replacement: Vec::new(), pieces }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Annotations in display order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn suggestion_count(&self) -> usize {
        self.annotations.len()
    }

    /// Flips annotation `annotation` (display order) and returns whether it
    /// now shows the replacement.
    pub fn toggle(&mut self, annotation: usize) -> Result<bool, AnnotationError> {
        let state = self
            .showing_replacement
            .get_mut(annotation)
            .ok_or(AnnotationError::UnknownAnnotation(annotation))?;
        *state = !*state;
        Ok(*state)
    }

    pub fn is_showing_replacement(&self, annotation: usize) -> bool {
        self.showing_replacement.get(annotation).copied().unwrap_or(false)
    }

    pub fn segments(&self) -> Vec<Segment<'_>> {
        self.pieces
            .iter()
            .map(|piece| match *piece {
                Piece::Literal { start, end } => Segment {
                    text: &self.text[start..end],
                    kind: SegmentKind::Literal,
                },
                Piece::Toggle { annotation } => {
                    let showing_replacement = self.showing_replacement[annotation];
                    let entry = &self.annotations[annotation];
                    Segment {
                        text: if showing_replacement { entry.replacement.as_str() } else { entry.original.as_str() },
                        kind: SegmentKind::Toggle { annotation, showing_replacement },
                    }
                }
            })
            .collect()
    }

    /// The text as currently displayed.
    pub fn display(&self) -> String {
        self.segments().iter().map(|segment| segment.text).collect()
    }
}
