use serde::{Deserialize, Serialize};

use super::clamp_unit;

/// Token accounting reported for a response.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt: u64,
    pub completion: u64,
    pub total: u64,
}

/// Citation summary for a response.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citations {
    pub count: u64,
    pub present: bool,
}

/// Quality metrics attached to an assistant message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseMetrics {
    /// Backend confidence in `[0, 1]`
    pub confidence: f64,
    /// End-to-end backend latency in milliseconds, never negative
    pub latency_ms: f64,
    pub token_usage: TokenUsage,
    pub citations: Citations,
}

impl ResponseMetrics {
    /// Build metrics from the raw values carried by a metadata event.
    ///
    /// The backend does not report real token usage on the streaming path,
    /// so the retrieved-sources count stands in for both `token_usage.total`
    /// and `citations.count`.
    pub fn from_backend(confidence: f64, latency_ms: f64, sources_count: u64) -> Self {
        let latency_ms = if latency_ms.is_finite() && latency_ms > 0.0 {
            latency_ms
        } else {
            0.0
        };
        Self {
            confidence: clamp_unit(confidence),
            latency_ms,
            token_usage: TokenUsage {
                prompt: 0,
                completion: 0,
                total: sources_count,
            },
            citations: Citations {
                count: sources_count,
                present: true,
            },
        }
    }

    /// Confidence as a whole percentage.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_backend_maps_sources_count() {
        let metrics = ResponseMetrics::from_backend(0.82, 1530.5, 4);
        assert_eq!(metrics.confidence, 0.82);
        assert_eq!(metrics.latency_ms, 1530.5);
        assert_eq!(metrics.token_usage.total, 4);
        assert_eq!(metrics.token_usage.prompt, 0);
        assert_eq!(metrics.citations.count, 4);
        assert!(metrics.citations.present);
    }

    #[test]
    fn test_from_backend_sanitizes_ranges() {
        let metrics = ResponseMetrics::from_backend(3.0, -12.0, 0);
        assert_eq!(metrics.confidence, 1.0);
        assert_eq!(metrics.latency_ms, 0.0);

        let metrics = ResponseMetrics::from_backend(f64::NAN, f64::NAN, 0);
        assert_eq!(metrics.confidence, 0.0);
        assert_eq!(metrics.latency_ms, 0.0);
    }

    #[test]
    fn test_confidence_percent() {
        assert_eq!(ResponseMetrics::from_backend(0.333, 0.0, 1).confidence_percent(), 33);
    }
}
