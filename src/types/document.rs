use serde::{Deserialize, Serialize};

/// A candidate document produced by a retriever, with its relevance score.
///
/// Owned by the delegate retriever; the filtering layer reads only `file_id`
/// and passes text and score through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub file_id: String,
    pub text: String,
    pub score: f64,
}

impl ScoredDocument {
    pub fn new(file_id: impl Into<String>, text: impl Into<String>, score: f64) -> Self {
        Self {
            file_id: file_id.into(),
            text: text.into(),
            score,
        }
    }
}
