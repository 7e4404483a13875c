//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// An ordered chunk of extracted document text. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in the document, starting at 0.
    pub ordinal: usize,
    pub text: String,
    /// Character offset of the segment start in the extracted text.
    pub offset: usize,
    /// 1-based page where the segment starts (`None` for plain-text sources).
    #[serde(default)]
    pub page: Option<u32>,
}

impl Segment {
    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A retrieval hit: a segment and its cosine similarity to the query.
#[derive(Clone, Debug, Serialize)]
pub struct ScoredSegment {
    pub score: f32,
    pub segment: Segment,
}
