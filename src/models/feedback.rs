use serde::{Deserialize, Serialize};

/// Thumbs-up / thumbs-down rating for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Negative,
    Positive,
}

impl Rating {
    /// Numeric score sent to the feedback endpoint (1 or 5).
    pub fn score(self) -> u8 {
        match self {
            Rating::Negative => 1,
            Rating::Positive => 5,
        }
    }
}

/// Feedback payload for `POST /api/v1/evaluation/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    pub query_id: String,
    pub rating: u8,
    pub helpful: bool,
    pub feedback_text: Option<String>,
}

impl Feedback {
    /// Create feedback for a query; `helpful` follows the rating.
    pub fn new(query_id: impl Into<String>, rating: Rating) -> Self {
        Self {
            query_id: query_id.into(),
            rating: rating.score(),
            helpful: rating == Rating::Positive,
            feedback_text: None,
        }
    }

    pub fn with_helpful(mut self, helpful: bool) -> Self {
        self.helpful = helpful;
        self
    }

    /// Attach free-form text; blank text is dropped.
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.feedback_text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }
}
