use crate::config::Config;
use crate::error::CfResult;
use crate::optimizer::Worker;
use crate::problem::{Problem, ProblemParams};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A published improvement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub score: i64,
    pub key: String,
    pub worker: usize,
    pub cycle: usize,
}

#[derive(Debug, Default)]
struct Published {
    best: Option<Snapshot>,
    updates: VecDeque<Snapshot>,
}

/// State shared by all workers of one solve: the cancellation flag, the
/// global best score and the latest published key.
#[derive(Debug)]
pub struct SharedState {
    started: AtomicBool,
    best_score: AtomicI64,
    published: Mutex<Published>,
    capacity: usize,
}

impl SharedState {
    /// `capacity` bounds the queue of undrained snapshots.
    pub fn new(capacity: usize) -> Self {
        Self {
            started: AtomicBool::new(false),
            best_score: AtomicI64::new(0),
            published: Mutex::new(Published::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn start(&self) {
        self.started.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.started.store(false, Ordering::Release);
    }

    #[inline(always)]
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    pub fn best_score(&self) -> i64 {
        self.best_score.load(Ordering::Acquire)
    }

    /// Raises the global best to `score`. True if `score` was strictly
    /// higher than every earlier value.
    #[inline]
    pub fn try_improve(&self, score: i64) -> bool {
        self.best_score.fetch_max(score, Ordering::AcqRel) < score
    }

    /// Stores `snapshot` as the latest best. The last writer wins.
    pub fn publish(&self, snapshot: Snapshot) {
        let mut published = self.lock();
        published.best = Some(snapshot.clone());
        published.updates.push_back(snapshot);
        while published.updates.len() > self.capacity {
            published.updates.pop_front();
        }
    }

    pub fn best_key(&self) -> Option<String> {
        self.lock().best.as_ref().map(|s| s.key.clone())
    }

    pub fn best_snapshot(&self) -> Option<Snapshot> {
        self.lock().best.clone()
    }

    /// Snapshots published since the last drain, oldest first.
    pub fn drain_updates(&self) -> Vec<Snapshot> {
        self.lock().updates.drain(..).collect()
    }

    // A worker panicking mid-publish leaves plain data behind, still usable.
    fn lock(&self) -> MutexGuard<'_, Published> {
        self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct SolveOptions {
    pub rounds: usize,
    pub temp_min: f64,
    pub temp_max: f64,
    pub max_workers: usize,
    pub seed: Option<u64>,
    pub snapshot_capacity: usize,
    pub stop_wait: Duration,
}

impl From<&Config> for SolveOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            rounds: cfg.search.rounds,
            temp_min: cfg.search.temp_min,
            temp_max: cfg.search.temp_max,
            max_workers: cfg.search.max_workers.unwrap_or_else(available_cores),
            seed: cfg.search.seed,
            snapshot_capacity: cfg.search.snapshot_capacity,
            stop_wait: Duration::from_millis(cfg.search.stop_wait_ms),
        }
    }
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

pub fn available_cores() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Threads for a solve: a quarter of the cores, at least one, at most
/// `max_workers`.
pub fn worker_count(max_workers: usize, available: usize) -> usize {
    max_workers.max(1).min((available / 4).max(1))
}

pub struct Solver;

impl Solver {
    /// Builds the problem (all fatal checks) and starts the workers.
    pub fn solve(params: ProblemParams, options: SolveOptions) -> CfResult<SolverHandle> {
        let problem = Arc::new(params.build_problem()?);
        Self::spawn(problem, options)
    }

    pub fn spawn(problem: Arc<Problem>, options: SolveOptions) -> CfResult<SolverHandle> {
        let shared = Arc::new(SharedState::new(options.snapshot_capacity));
        shared.start();

        let count = worker_count(options.max_workers, available_cores());
        info!(
            "Starting {} workers ({} rounds per cycle, temperature {}..{})",
            count, options.rounds, options.temp_min, options.temp_max
        );

        let mut handle = SolverHandle {
            problem: problem.clone(),
            shared: shared.clone(),
            workers: Vec::with_capacity(count),
            stop_wait: options.stop_wait,
            started_at: Instant::now(),
            cycles: 0,
        };

        for id in 0..count {
            let worker = Worker::new(
                id,
                problem.clone(),
                shared.clone(),
                options.seed.map(|s| s.wrapping_add(id as u64)),
                options.rounds,
                options.temp_min,
                options.temp_max,
            );
            // On failure the dropped handle stops the workers already running.
            let join = thread::Builder::new()
                .name(format!("cipherforge-worker-{}", id))
                .spawn(move || worker.run())?;
            handle.workers.push(join);
        }
        Ok(handle)
    }
}

/// Owner of a running solve. Dropping it cancels the workers.
pub struct SolverHandle {
    problem: Arc<Problem>,
    shared: Arc<SharedState>,
    workers: Vec<JoinHandle<usize>>,
    stop_wait: Duration,
    started_at: Instant,
    cycles: usize,
}

impl SolverHandle {
    /// Clears the run flag and waits up to the configured bound for the
    /// workers to exit. True if every worker has been joined.
    pub fn stop(&mut self) -> bool {
        self.shared.stop();

        let deadline = Instant::now() + self.stop_wait;
        while !self.workers.iter().all(JoinHandle::is_finished) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        let (finished, pending): (Vec<_>, Vec<_>) =
            self.workers.drain(..).partition(JoinHandle::is_finished);
        self.workers = pending;
        for join in finished {
            self.collect(join);
        }

        if self.workers.is_empty() {
            info!(
                "Solve stopped after {:.1}s, {} cycles, best score {}",
                self.started_at.elapsed().as_secs_f32(),
                self.cycles,
                self.shared.best_score()
            );
            true
        } else {
            warn!("{} workers still running after stop", self.workers.len());
            false
        }
    }

    /// Stops and blocks until every worker has exited.
    pub fn join(&mut self) {
        self.shared.stop();
        for join in std::mem::take(&mut self.workers) {
            self.collect(join);
        }
    }

    fn collect(&mut self, join: JoinHandle<usize>) {
        match join.join() {
            Ok(cycles) => self.cycles += cycles,
            Err(_) => warn!("A worker thread panicked"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn best_score(&self) -> i64 {
        self.shared.best_score()
    }

    pub fn best_key(&self) -> Option<String> {
        self.shared.best_key()
    }

    pub fn best_snapshot(&self) -> Option<Snapshot> {
        self.shared.best_snapshot()
    }

    pub fn drain_updates(&self) -> Vec<Snapshot> {
        self.shared.drain_updates()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Completed cycles of the workers joined so far.
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }
}

impl Drop for SolverHandle {
    fn drop(&mut self) {
        self.shared.stop();
    }
}
