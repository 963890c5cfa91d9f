use serde::Serialize;

/// Breakdown of one fitness evaluation, used by reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreDetails {
    pub score: i64,
    pub ngram_sum: i64,
    pub ngram_count: u64,
    /// Resolved ciphertext positions.
    pub monogram_count: u64,
    /// `dim * sum(freq^2)`, 1.0 for a perfectly flat distribution.
    pub ic: f64,
}
