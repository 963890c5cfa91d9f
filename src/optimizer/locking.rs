use crate::consts::UNASSIGNED;
use crate::scorer::Cell;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Glyph shared by every multi-letter plaintext label.
const MULTI_LETTER_GLYPH: u16 = u16::MAX;

/// Windows of the reference stream used to freeze verified decryptions.
///
/// Any stretch of `length` decrypted symbols that also occurs in the
/// reference corpus is trusted, and the assignments behind it are forced for
/// the rest of the search.
#[derive(Debug, Clone)]
pub struct ReferenceLocks {
    length: usize,
    multi_letter: Vec<bool>,
    windows: HashSet<Box<[u16]>>,
}

impl ReferenceLocks {
    /// `reference` holds plaintext indices (`UNASSIGNED` breaks a window),
    /// `multi_letter[p]` tells which labels render as the placeholder.
    pub fn build(reference: &[i32], multi_letter: &[bool], length: usize) -> Self {
        let multi_letter = multi_letter.to_vec();
        let glyphs: Vec<Option<u16>> = reference
            .iter()
            .map(|&p| glyph(&multi_letter, p))
            .collect();

        let windows: HashSet<Box<[u16]>> = if length == 0 || glyphs.len() < length {
            HashSet::new()
        } else {
            glyphs
                .par_windows(length)
                .filter_map(|w| w.iter().copied().collect::<Option<Box<[u16]>>>())
                .collect()
        };

        debug!(
            "Reference locks: {} distinct windows of length {}",
            windows.len(),
            length
        );

        Self {
            length,
            multi_letter,
            windows,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Copies `c_to_p[c]` into `forced[c]` for every symbol covered by a
    /// decrypted window found in the reference. Returns how many symbols
    /// became forced.
    pub fn apply(&self, cells: &[Cell], c_to_p: &[i32], forced: &mut [i32]) -> usize {
        if self.length == 0 || cells.len() < self.length {
            return 0;
        }

        let glyphs: Vec<Option<u16>> = cells
            .iter()
            .map(|cell| match *cell {
                Cell::Symbol(c) => glyph(&self.multi_letter, c_to_p[c]),
                Cell::Fixed(p) => glyph(&self.multi_letter, p as i32),
                Cell::Gap => None,
            })
            .collect();

        let mut window: Vec<u16> = Vec::with_capacity(self.length);
        let mut newly_forced = 0;
        for start in 0..=(glyphs.len() - self.length) {
            window.clear();
            let span = &glyphs[start..start + self.length];
            if span.iter().any(Option::is_none) {
                continue;
            }
            window.extend(span.iter().flatten());
            if !self.windows.contains(window.as_slice()) {
                continue;
            }

            for cell in &cells[start..start + self.length] {
                if let Cell::Symbol(c) = *cell {
                    if forced[c] == UNASSIGNED {
                        forced[c] = c_to_p[c];
                        newly_forced += 1;
                    }
                }
            }
        }
        newly_forced
    }
}

#[inline]
fn glyph(multi_letter: &[bool], p: i32) -> Option<u16> {
    if p == UNASSIGNED {
        None
    } else if multi_letter[p as usize] {
        Some(MULTI_LETTER_GLYPH)
    } else {
        Some(p as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_window_forces_symbols() {
        // Reference "abcdeabcde" over {a..e}
        let reference: Vec<i32> = (0..10).map(|i| i % 5).collect();
        let locks = ReferenceLocks::build(&reference, &[false; 5], 4);

        // Five symbols decrypting to "xbcdx" style: symbols 1..=3 plus 0 read "abcd"
        let cells = [Cell::Symbol(0), Cell::Symbol(1), Cell::Symbol(2), Cell::Symbol(3), Cell::Symbol(4)];
        let c_to_p = [0, 1, 2, 3, 3];
        let mut forced = [UNASSIGNED; 5];

        let n = locks.apply(&cells, &c_to_p, &mut forced);
        assert_eq!(n, 4);
        assert_eq!(forced, [0, 1, 2, 3, UNASSIGNED]);
    }

    #[test]
    fn test_gaps_break_windows() {
        let reference: Vec<i32> = (0..10).map(|i| i % 5).collect();
        let locks = ReferenceLocks::build(&reference, &[false; 5], 4);
        let cells = [Cell::Symbol(0), Cell::Symbol(1), Cell::Gap, Cell::Symbol(2), Cell::Symbol(3)];
        let mut forced = [UNASSIGNED; 4];
        assert_eq!(locks.apply(&cells, &[0, 1, 2, 3], &mut forced), 0);
    }

    #[test]
    fn test_multi_letter_placeholder_matches() {
        // label 2 is a digraph; reference "a b ch a"
        let reference = [0, 1, 2, 0];
        let multi = [false, false, true];
        let locks = ReferenceLocks::build(&reference, &multi, 4);
        assert_eq!(locks.window_count(), 1);

        let cells = [Cell::Symbol(0), Cell::Symbol(1), Cell::Symbol(2), Cell::Symbol(3)];
        let mut forced = [UNASSIGNED; 4];
        assert_eq!(locks.apply(&cells, &[0, 1, 2, 0], &mut forced), 4);
    }

    #[test]
    fn test_fixed_cells_complete_windows() {
        let reference: Vec<i32> = (0..10).map(|i| i % 5).collect();
        let locks = ReferenceLocks::build(&reference, &[false; 5], 4);
        let cells = [Cell::Fixed(0), Cell::Symbol(0), Cell::Symbol(1), Cell::Symbol(2)];
        let mut forced = [UNASSIGNED; 3];
        assert_eq!(locks.apply(&cells, &[1, 2, 3], &mut forced), 3);
        assert_eq!(forced, [1, 2, 3]);
    }
}
