use crate::consts::UNASSIGNED;
use fastrand::Rng;

/// Number of symbols currently assigned to each plaintext index.
pub fn homophone_counts(c_to_p: &[i32], dim: usize) -> Vec<usize> {
    let mut counts = vec![0; dim];
    for &p in c_to_p {
        if p != UNASSIGNED {
            counts[p as usize] += 1;
        }
    }
    counts
}

/// A random assignment that keeps every forced entry and never exceeds
/// `capacities`.
///
/// Free symbols are visited in shuffled order and each takes a uniformly
/// random plaintext with room left. A symbol stays `UNASSIGNED` only if the
/// capacities are exhausted.
pub fn random_assignment(rng: &mut Rng, forced: &[i32], capacities: &[usize]) -> Vec<i32> {
    let mut c_to_p = forced.to_vec();
    let mut counts = homophone_counts(&c_to_p, capacities.len());

    let mut free: Vec<usize> = (0..forced.len())
        .filter(|&c| forced[c] == UNASSIGNED)
        .collect();
    rng.shuffle(&mut free);

    let mut open: Vec<usize> = Vec::with_capacity(capacities.len());
    for c in free {
        open.clear();
        open.extend((0..capacities.len()).filter(|&p| counts[p] < capacities[p]));
        if open.is_empty() {
            break;
        }
        let p = open[rng.usize(..open.len())];
        c_to_p[c] = p as i32;
        counts[p] += 1;
    }
    c_to_p
}
