use std::ops::RangeInclusive;

/// Index value of a token, symbol or plaintext slot that is not resolved.
pub const UNASSIGNED: i32 = -1;

/// Scale of the log-compressed n-gram weights: `round(LOG_SCALE * ln(1 + count))`.
pub const LOG_SCALE: f64 = 10_000.0;

/// Scale of the final fitness value.
pub const SCORE_SCALE: f64 = 1_000.0;

/// Acceptance probability below which a worse move is always rejected.
pub const ACCEPT_PROBABILITY_FLOOR: f64 = 0.0085;

/// Supported n-gram orders.
pub const SUPPORTED_ORDERS: RangeInclusive<usize> = 4..=6;

/// Largest configurable number of homophones per plaintext letter.
pub const MAX_HOMOPHONES_LIMIT: usize = 7;

/// Plaintext label used for word separators when spaces are kept.
pub const SPACE_LABEL: &str = "_";

/// Cells above this count get a warning when the n-gram table is allocated.
pub const LARGE_TABLE_CELLS: usize = 100_000_000;

/// Homophone group quotas, indexed by `max_homophones - 1`.
///
/// Entry `i` of a row is the number of letters (in priority order) that get
/// `max_homophones - i` homophones. Letters past the end of the row get one.
pub const HOMOPHONE_QUOTAS: [&[usize]; MAX_HOMOPHONES_LIMIT] = [
    &[],
    &[6],
    &[3, 5],
    &[2, 3, 5],
    &[1, 2, 3, 5],
    &[1, 1, 2, 3, 5],
    &[1, 1, 1, 2, 3, 6],
];
