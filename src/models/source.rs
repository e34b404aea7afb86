use serde::{Deserialize, Serialize};

use super::clamp_unit;

/// Display title used when the backend did not name a source.
pub const UNTITLED_SOURCE: &str = "Untitled document";

/// A retrieved evidence snippet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    /// Document title, if the backend supplied one
    #[serde(default)]
    pub title: Option<String>,
    /// Retrieved text fragment
    #[serde(default)]
    pub excerpt: String,
    /// Similarity to the query, in `[0, 1]`
    pub similarity: f64,
}

impl Source {
    /// Create a source, clamping `similarity` into `[0, 1]`.
    pub fn new(title: Option<String>, excerpt: impl Into<String>, similarity: f64) -> Self {
        Self {
            title: title.filter(|t| !t.trim().is_empty()),
            excerpt: excerpt.into(),
            similarity: clamp_unit(similarity),
        }
    }

    /// Title for display, falling back to [`UNTITLED_SOURCE`].
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED_SOURCE)
    }

    /// Similarity as a whole percentage.
    pub fn similarity_percent(&self) -> u8 {
        (self.similarity * 100.0).round() as u8
    }
}
