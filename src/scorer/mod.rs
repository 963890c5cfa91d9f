pub mod engine;
pub mod ngrams;
pub mod types;

pub use self::engine::fitness;
pub use self::ngrams::NgramTable;
pub use self::types::ScoreDetails;
use std::sync::Arc;

/// What a ciphertext position contributes to scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Position of a searchable symbol (index into `cList`).
    Symbol(usize),
    /// Symbol outside the search whose plaintext index is known.
    Fixed(usize),
    /// Line break or ignored position. Breaks n-gram context.
    Gap,
}

/// Fitness of trial assignments against one ciphertext.
///
/// The table and cells are shared read-only; each worker owns a `Scorer`
/// clone for its monogram scratch buffer.
#[derive(Debug, Clone)]
pub struct Scorer {
    pub table: Arc<NgramTable>,
    pub cells: Arc<[Cell]>,
    monograms: Vec<u32>,
}

impl Scorer {
    pub fn new(table: Arc<NgramTable>, cells: Arc<[Cell]>) -> Self {
        let monograms = vec![0; table.dim()];
        Self {
            table,
            cells,
            monograms,
        }
    }

    /// Scores `c_to_p` (symbol index -> plaintext index or `UNASSIGNED`).
    #[inline]
    pub fn score(&mut self, c_to_p: &[i32]) -> i64 {
        let (sum, count) = engine::accumulate(self, c_to_p);
        fitness(sum, count, &self.monograms)
    }

    pub fn score_details(&mut self, c_to_p: &[i32]) -> ScoreDetails {
        let (ngram_sum, ngram_count) = engine::accumulate(self, c_to_p);
        ScoreDetails {
            score: fitness(ngram_sum, ngram_count, &self.monograms),
            ngram_sum,
            ngram_count,
            monogram_count: self.monograms.iter().map(|&m| m as u64).sum(),
            ic: engine::index_of_coincidence(&self.monograms).unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::UNASSIGNED;

    fn cells(symbols: &[Option<usize>]) -> Arc<[Cell]> {
        symbols
            .iter()
            .map(|s| s.map_or(Cell::Gap, Cell::Symbol))
            .collect()
    }

    fn table() -> Arc<NgramTable> {
        // Reference "abcdabcdabcd" over alphabet {a, b, c, d}
        let indices: Vec<i32> = (0..12).map(|i| i % 4).collect();
        Arc::new(NgramTable::build(&indices, 4, 4).unwrap())
    }

    #[test]
    fn test_zero_without_ngrams() {
        let mut scorer = Scorer::new(table(), cells(&[Some(0), Some(1), None, Some(2), Some(3)]));
        assert_eq!(scorer.score(&[0, 1, 2, 3]), 0);
    }

    #[test]
    fn test_zero_without_monograms() {
        let mut scorer = Scorer::new(table(), cells(&[Some(0), Some(1), Some(2), Some(3)]));
        let unassigned = [UNASSIGNED; 4];
        assert_eq!(scorer.score(&unassigned), 0);
        assert_eq!(fitness(100, 1, &[0, 0, 0, 0]), 0);
    }

    #[test]
    fn test_true_mapping_beats_shuffled() {
        let mut scorer = Scorer::new(
            table(),
            cells(&[Some(0), Some(1), Some(2), Some(3), Some(0), Some(1), Some(2), Some(3)]),
        );
        let good = scorer.score(&[0, 1, 2, 3]);
        let bad = scorer.score(&[1, 0, 2, 3]);
        assert!(good > 0);
        assert!(good > bad);
    }

    #[test]
    fn test_concentration_is_penalized() {
        // Same raw n-gram hits, flat vs degenerate letter usage.
        let balanced = fitness(40_000, 4, &[2, 2, 2, 2]);
        let degenerate = fitness(40_000, 4, &[8, 0, 0, 0]);
        assert!(degenerate <= balanced);
        assert_eq!(balanced, 10_000_000);
        assert_eq!(degenerate, 2_500_000);
    }

    #[test]
    fn test_details_match_score() {
        let mut scorer = Scorer::new(table(), cells(&[Some(0), Some(1), Some(2), Some(3)]));
        let d = scorer.score_details(&[0, 1, 2, 3]);
        assert_eq!(d.score, scorer.score(&[0, 1, 2, 3]));
        assert_eq!(d.ngram_count, 1);
        assert_eq!(d.monogram_count, 4);
        assert!((d.ic - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_cells_give_context() {
        // "a b c" searchable, "d" pinned: the only 4-gram needs the pinned letter.
        let fixed: Arc<[Cell]> =
            vec![Cell::Symbol(0), Cell::Symbol(1), Cell::Symbol(2), Cell::Fixed(3)].into();
        let mut scorer = Scorer::new(table(), fixed);
        let d = scorer.score_details(&[0, 1, 2]);
        assert_eq!(d.ngram_count, 1);
        assert_eq!(d.monogram_count, 4);
        assert!(d.score > 0);

        let mut gapped = Scorer::new(table(), cells(&[Some(0), Some(1), Some(2), None]));
        assert_eq!(gapped.score(&[0, 1, 2]), 0);
    }
}
