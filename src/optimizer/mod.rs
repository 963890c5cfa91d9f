pub mod anneal;
pub mod capacity;
pub mod locking;
pub mod mutation;
pub mod runner;

use self::anneal::accept;
use self::mutation::{homophone_counts, random_assignment};
use self::runner::{SharedState, Snapshot};
use crate::consts::UNASSIGNED;
use crate::problem::Problem;
use crate::scorer::Scorer;
use std::sync::Arc;
use tracing::{debug, info};

/// Annealing state of one search thread.
///
/// Each worker owns its scorer scratch, assignment and forced map. Only
/// `SharedState` is touched by more than one thread.
pub struct Worker {
    pub id: usize,
    problem: Arc<Problem>,
    shared: Arc<SharedState>,
    scorer: Scorer,

    c_to_p: Vec<i32>,
    forced: Vec<i32>,
    counts: Vec<usize>,
    score: i64,

    rng: fastrand::Rng,
    rounds: usize,
    temp_min: f64,
    temp_max: f64,
    cycles: usize,
}

impl Worker {
    pub fn new(
        id: usize,
        problem: Arc<Problem>,
        shared: Arc<SharedState>,
        seed: Option<u64>,
        rounds: usize,
        temp_min: f64,
        temp_max: f64,
    ) -> Self {
        let rng = if let Some(s) = seed {
            fastrand::Rng::with_seed(s)
        } else {
            fastrand::Rng::new()
        };

        let scorer = problem.scorer();
        let forced = problem.forced.clone();
        let dim = problem.p_list.len();

        Self {
            id,
            scorer,
            c_to_p: vec![UNASSIGNED; forced.len()],
            counts: vec![0; dim],
            forced,
            problem,
            shared,
            score: 0,
            rng,
            rounds: rounds.max(1),
            temp_min,
            temp_max,
            cycles: 0,
        }
    }

    /// Runs cycles until the shared flag is cleared. Returns the number of
    /// completed cycles.
    pub fn run(mut self) -> usize {
        debug!("Worker {} started", self.id);
        while self.shared.is_running() {
            if !self.run_cycle() {
                break;
            }
        }
        debug!("Worker {} stopped after {} cycles", self.id, self.cycles);
        self.cycles
    }

    /// One random restart followed by `rounds` annealing rounds. Returns
    /// false if cancelled midway.
    pub fn run_cycle(&mut self) -> bool {
        self.restart();
        for round in 0..self.rounds {
            let temperature = self.temperature(round);
            if !self.round(temperature) {
                return false;
            }
        }
        self.cycles += 1;
        true
    }

    pub fn restart(&mut self) {
        self.c_to_p = random_assignment(&mut self.rng, &self.forced, &self.problem.capacities);
        self.counts = homophone_counts(&self.c_to_p, self.problem.p_list.len());
        self.score = self.scorer.score(&self.c_to_p);
        self.publish_if_best();
    }

    /// Randomized linear schedule: the upper bound shrinks from `temp_max`
    /// towards `temp_min` over the cycle.
    pub fn temperature(&mut self, round: usize) -> f64 {
        let remaining = self.rounds - 1 - round.min(self.rounds - 1);
        self.temp_min
            + self.rng.f64() * (self.temp_max - self.temp_min) * (remaining + 1) as f64
                / self.rounds as f64
    }

    /// Reassignment moves then swap moves. Returns false if cancelled.
    pub fn round(&mut self, temperature: f64) -> bool {
        self.reassign_moves(temperature) && self.swap_moves(temperature)
    }

    fn reassign_moves(&mut self, temperature: f64) -> bool {
        let n = self.c_to_p.len();
        let dim = self.counts.len();
        let shift_c = self.rng.usize(..n);
        let shift_p = self.rng.usize(..dim);

        for i in 0..n {
            let c = (i + shift_c) % n;
            for j in 0..dim {
                if self.forced[c] != UNASSIGNED {
                    break;
                }
                let p = (j + shift_p) % dim;
                if self.c_to_p[c] == p as i32 {
                    continue;
                }
                if self.counts[p] >= self.problem.capacities[p] {
                    continue;
                }
                if self.problem.multi_letter[p] && self.counts[p] >= 1 {
                    continue;
                }
                if !self.shared.is_running() {
                    return false;
                }

                let old = self.c_to_p[c];
                self.assign(c, p as i32);
                let new_score = self.scorer.score(&self.c_to_p);
                if accept(new_score, self.score, temperature, &mut self.rng) {
                    self.score = new_score;
                    self.publish_if_best();
                } else {
                    self.assign(c, old);
                }
            }
        }
        true
    }

    fn swap_moves(&mut self, temperature: f64) -> bool {
        let n = self.c_to_p.len();
        let shift = self.rng.usize(..n);

        for i in 0..n {
            let c1 = (i + shift) % n;
            for j in (i + 1)..n {
                let c2 = (j + shift) % n;
                if self.forced[c1] != UNASSIGNED {
                    break;
                }
                if self.forced[c2] != UNASSIGNED {
                    continue;
                }
                let (p1, p2) = (self.c_to_p[c1], self.c_to_p[c2]);
                if p1 == p2 {
                    continue;
                }
                if !self.shared.is_running() {
                    return false;
                }

                self.c_to_p.swap(c1, c2);
                let new_score = self.scorer.score(&self.c_to_p);
                if accept(new_score, self.score, temperature, &mut self.rng) {
                    self.score = new_score;
                    self.publish_if_best();
                } else {
                    self.c_to_p.swap(c1, c2);
                }
            }
        }
        true
    }

    #[inline]
    fn assign(&mut self, c: usize, p: i32) {
        let old = self.c_to_p[c];
        if old != UNASSIGNED {
            self.counts[old as usize] -= 1;
        }
        if p != UNASSIGNED {
            self.counts[p as usize] += 1;
        }
        self.c_to_p[c] = p;
    }

    /// Publishes the current key if it beats the global best, then folds any
    /// newly verified reference windows into `forced`.
    ///
    /// The snapshot is serialized against the forced map as it was before
    /// this lock pass.
    fn publish_if_best(&mut self) {
        if !self.shared.try_improve(self.score) {
            return;
        }

        let mut scratch = self.forced.clone();
        let newly_locked = match &self.problem.locks {
            Some(locks) => locks.apply(&self.problem.cells, &self.c_to_p, &mut scratch),
            None => 0,
        };

        let key = self.problem.format_key(&self.c_to_p, &self.forced);
        self.shared.publish(Snapshot {
            score: self.score,
            key,
            worker: self.id,
            cycle: self.cycles,
        });
        info!(
            "Worker {} cycle {}: new best {}",
            self.id, self.cycles, self.score
        );

        if newly_locked > 0 {
            debug!("Worker {}: {} symbols locked", self.id, newly_locked);
            self.forced = scratch;
        }
    }

    pub fn assignment(&self) -> &[i32] {
        &self.c_to_p
    }

    pub fn forced(&self) -> &[i32] {
        &self.forced
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }
}
