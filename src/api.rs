use crate::config::Config;
use crate::key::KeyStore;
use crate::optimizer::runner::{Snapshot, SolveOptions, Solver, SolverHandle};
use crate::problem::ProblemParams;
use crate::scorer::ScoreDetails;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;

/// Service state for a UI front end. Holds at most one active solve.
#[derive(Default)]
pub struct CipherForgeState {
    pub solver: Mutex<Option<SolverHandle>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SolveStatus {
    pub running: bool,
    pub best_score: i64,
    pub best_key: Option<String>,
    pub decryption: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub score: i64,
    pub ngram_count: u64,
    pub monogram_count: u64,
    pub ic: f64,
    pub decryption: String,
}

impl From<(&ScoreDetails, String)> for Evaluation {
    fn from((d, decryption): (&ScoreDetails, String)) -> Self {
        Self {
            score: d.score,
            ngram_count: d.ngram_count,
            monogram_count: d.monogram_count,
            ic: d.ic,
            decryption,
        }
    }
}

/// Service: start a new solve, stopping and joining any previous one first.
pub fn start_solve(
    state: &CipherForgeState,
    config: &Config,
    corpus: String,
    lines: Vec<Vec<String>>,
    key: KeyStore,
) -> Result<usize, String> {
    let mut guard = state.solver.lock().map_err(|e| e.to_string())?;
    if let Some(mut previous) = guard.take() {
        info!("API: Replacing running solve");
        previous.join();
    }

    config.search.validate().map_err(|e| e.to_string())?;
    let params = ProblemParams::builder()
        .language(config.language.clone())
        .corpus(corpus)
        .lines(lines)
        .key(key)
        .build();

    let handle = Solver::solve(params, SolveOptions::from(config)).map_err(|e| e.to_string())?;
    let workers = handle.worker_count();
    *guard = Some(handle);
    Ok(workers)
}

/// Service: stop the active solve. Returns its last status.
pub fn stop_solve(state: &CipherForgeState) -> Result<SolveStatus, String> {
    let mut guard = state.solver.lock().map_err(|e| e.to_string())?;
    let handle = guard.as_mut().ok_or("No solve in progress")?;
    handle.stop();
    Ok(status_of(handle))
}

/// Service: snapshots published since the last poll.
pub fn poll_updates(state: &CipherForgeState) -> Result<Vec<Snapshot>, String> {
    let guard = state.solver.lock().map_err(|e| e.to_string())?;
    Ok(guard
        .as_ref()
        .map(SolverHandle::drain_updates)
        .unwrap_or_default())
}

pub fn current_best(state: &CipherForgeState) -> Result<SolveStatus, String> {
    let guard = state.solver.lock().map_err(|e| e.to_string())?;
    let handle = guard.as_ref().ok_or("No solve started")?;
    Ok(status_of(handle))
}

/// Service: score a key against a ciphertext without searching.
pub fn evaluate_key(
    config: &Config,
    corpus: String,
    lines: Vec<Vec<String>>,
    key: KeyStore,
) -> Result<Evaluation, String> {
    let problem = ProblemParams::builder()
        .language(config.language.clone())
        .corpus(corpus)
        .lines(lines)
        .key(key.clone())
        .build()
        .build_problem()
        .map_err(|e| e.to_string())?;

    let c_to_p = problem.assignment_from_key(&key);
    let details = problem.scorer().score_details(&c_to_p);
    Ok(Evaluation::from((&details, problem.decrypt(&c_to_p))))
}

fn status_of(handle: &SolverHandle) -> SolveStatus {
    let best_key = handle.best_key();
    let decryption = best_key
        .as_deref()
        .and_then(|text| KeyStore::parse(text).ok())
        .map(|key| {
            let problem = handle.problem();
            problem.decrypt(&problem.assignment_from_key(&key))
        });
    SolveStatus {
        running: handle.is_running(),
        best_score: handle.best_score(),
        best_key,
        decryption,
    }
}
