use super::ngrams::RollingIndex;
use super::{Cell, Scorer};
use crate::consts::{SCORE_SCALE, UNASSIGNED};

/// Walks the ciphertext once, filling `scorer.monograms` and returning the
/// n-gram weight sum and count.
#[inline(always)]
pub fn accumulate(scorer: &mut Scorer, c_to_p: &[i32]) -> (i64, u64) {
    scorer.monograms.fill(0);

    let table = &scorer.table;
    let mut window = RollingIndex::new(table.dim(), table.order());
    let mut sum = 0i64;
    let mut count = 0u64;

    for cell in scorer.cells.iter() {
        let p = match *cell {
            Cell::Symbol(c) => c_to_p[c],
            Cell::Fixed(p) => p as i32,
            Cell::Gap => UNASSIGNED,
        };
        if p != UNASSIGNED {
            scorer.monograms[p as usize] += 1;
        }
        if let Some(idx) = window.push(p) {
            sum += table.weight(idx) as i64;
            count += 1;
        }
    }
    (sum, count)
}

/// `dim * sum(freq_i^2)` over the monogram counts, or `None` when nothing is
/// resolved.
pub fn index_of_coincidence(monograms: &[u32]) -> Option<f64> {
    let total: u64 = monograms.iter().map(|&m| m as u64).sum();
    if total == 0 {
        return None;
    }
    let total = total as f64;
    let sum_sq: f64 = monograms
        .iter()
        .map(|&m| {
            let f = m as f64 / total;
            f * f
        })
        .sum();
    Some(monograms.len() as f64 * sum_sq)
}

/// Average n-gram weight, scaled and divided by the monogram index of
/// coincidence. Zero when no n-gram or no monogram was resolved.
pub fn fitness(ngram_sum: i64, ngram_count: u64, monograms: &[u32]) -> i64 {
    if ngram_count == 0 {
        return 0;
    }
    match index_of_coincidence(monograms) {
        Some(ic) => (SCORE_SCALE * (ngram_sum as f64 / ngram_count as f64) / ic) as i64,
        None => 0,
    }
}
