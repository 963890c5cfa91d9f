use crate::consts::{LARGE_TABLE_CELLS, LOG_SCALE, SUPPORTED_ORDERS, UNASSIGNED};
use crate::error::{CfResult, CipherForgeError};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Log-weighted n-gram frequencies over a flat `dim^order` table.
///
/// Cells are addressed row-major with the earliest position most
/// significant, see [`index`].
#[derive(Debug, Clone)]
pub struct NgramTable {
    order: usize,
    dim: usize,
    cells: Vec<i32>,
}

impl NgramTable {
    /// Counts every run of `order` consecutive resolved indices, then replaces
    /// each non-zero count by `round(10000 * ln(1 + count))`.
    pub fn build(indices: &[i32], dim: usize, order: usize) -> CfResult<Self> {
        if !SUPPORTED_ORDERS.contains(&order) {
            return Err(CipherForgeError::UnsupportedOrder(order));
        }
        let size = table_size(dim, order)?;
        if size > LARGE_TABLE_CELLS {
            warn!(
                "Allocating {} n-gram cells ({} symbols, order {})",
                size, dim, order
            );
        }

        let mut cells = vec![0i32; size];
        let mut window = RollingIndex::new(dim, order);
        let mut ngrams = 0usize;
        for &p in indices {
            if let Some(idx) = window.push(p) {
                cells[idx] = cells[idx].saturating_add(1);
                ngrams += 1;
            }
        }

        cells
            .par_iter_mut()
            .filter(|c| **c > 0)
            .for_each(|c| *c = log_weight(*c as u32));

        debug!(
            "N-gram table built: order {}, {} cells, {} n-grams counted",
            order, size, ngrams
        );

        Ok(Self { order, dim, cells })
    }

    #[inline(always)]
    pub fn weight(&self, index: usize) -> i32 {
        self.cells[index]
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn non_zero(&self) -> usize {
        self.cells.par_iter().filter(|&&c| c > 0).count()
    }

    /// The `n` heaviest cells as (decoded coordinates, weight), heaviest first.
    pub fn top(&self, n: usize) -> Vec<(Vec<usize>, i32)> {
        let mut hits: Vec<(usize, i32)> = self
            .cells
            .par_iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(i, &c)| (i, c))
            .collect();
        hits.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.truncate(n);
        hits.into_iter()
            .map(|(i, c)| (decode(i, self.dim, self.order), c))
            .collect()
    }
}

/// Mixed-radix window over the last `order` plaintext indices.
///
/// An unresolved index resets the window; it yields a cell index only once
/// `order` consecutive resolved indices have been pushed.
#[derive(Debug, Clone)]
pub struct RollingIndex {
    dim: usize,
    order: usize,
    prefix_modulus: usize,
    index: usize,
    run: usize,
}

impl RollingIndex {
    pub fn new(dim: usize, order: usize) -> Self {
        Self {
            dim,
            order,
            prefix_modulus: dim.pow(order.saturating_sub(1) as u32).max(1),
            index: 0,
            run: 0,
        }
    }

    #[inline(always)]
    pub fn push(&mut self, p: i32) -> Option<usize> {
        if p == UNASSIGNED {
            self.index = 0;
            self.run = 0;
            return None;
        }
        self.index = (self.index % self.prefix_modulus) * self.dim + p as usize;
        self.run += 1;
        (self.run >= self.order).then_some(self.index)
    }
}

#[inline]
pub fn log_weight(count: u32) -> i32 {
    (LOG_SCALE * (count as f64).ln_1p()).round() as i32
}

/// Flat index of `coords`, earliest coordinate most significant.
pub fn index(coords: &[usize], dim: usize) -> usize {
    coords.iter().fold(0, |acc, &p| acc * dim + p)
}

/// Inverse of [`index`] for a fixed `order`.
pub fn decode(mut index: usize, dim: usize, order: usize) -> Vec<usize> {
    let mut coords = vec![0; order];
    for slot in coords.iter_mut().rev() {
        *slot = index % dim;
        index /= dim;
    }
    coords
}

fn table_size(dim: usize, order: usize) -> CfResult<usize> {
    if dim == 0 {
        return Err(CipherForgeError::EmptyCorpus);
    }
    dim.checked_pow(order as u32)
        .filter(|&s| s <= isize::MAX as usize / std::mem::size_of::<i32>())
        .ok_or_else(|| {
            CipherForgeError::Config(format!(
                "n-gram table for {} symbols at order {} is too large",
                dim, order
            ))
        })
}
