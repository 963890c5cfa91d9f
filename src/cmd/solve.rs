use super::Inputs;
use crate::reports;
use cipherforge::config::Config;
use cipherforge::error::CfResult;
use cipherforge::key::KeyStore;
use cipherforge::optimizer::runner::{SolveOptions, Solver};
use cipherforge::problem::ProblemParams;
use clap::Args;
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub config: Config,

    /// Search time in seconds.
    #[arg(short = 'T', long, default_value_t = 60)]
    pub time: u64,

    /// Write the best key to this file.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the final result as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Progress polling interval in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub poll_ms: u64,
}

#[derive(Serialize)]
struct SolveReport<'a> {
    score: i64,
    cycles: usize,
    elapsed_secs: f32,
    key: &'a str,
    decryption: &'a str,
}

pub fn run(args: &SolveArgs, config: &Config, inputs: Inputs) -> CfResult<()> {
    config.search.validate()?;
    let params = ProblemParams::builder()
        .language(config.language.clone())
        .corpus(inputs.corpus)
        .lines(inputs.lines)
        .key(inputs.key)
        .build();

    let mut handle = Solver::solve(params, SolveOptions::from(config))?;
    println!(
        "🔥 Solving with {} workers for {}s",
        handle.worker_count(),
        args.time
    );

    let deadline = Instant::now() + Duration::from_secs(args.time);
    let poll = Duration::from_millis(args.poll_ms.max(10));
    while Instant::now() < deadline {
        thread::sleep(poll.min(deadline.saturating_duration_since(Instant::now())));
        for update in handle.drain_updates() {
            println!(
                "  {:>8.1}s | score {:>10} | worker {} cycle {}",
                handle.elapsed().as_secs_f32(),
                update.score,
                update.worker,
                update.cycle
            );
        }
    }

    if !handle.stop() {
        warn!("Some workers did not stop in time; waiting");
        handle.join();
    }

    let problem = handle.problem().clone();
    let Some(best) = handle.best_snapshot() else {
        println!("No improvement found.");
        return Ok(());
    };

    let key = KeyStore::parse(&best.key)?;
    let decryption = problem.decrypt(&problem.assignment_from_key(&key));

    if let Some(path) = &args.output {
        key.save_to_file(path)?;
        info!("Key written to {}", path);
    }

    if args.json {
        let report = SolveReport {
            score: best.score,
            cycles: handle.cycles(),
            elapsed_secs: handle.elapsed().as_secs_f32(),
            key: &best.key,
            decryption: &decryption,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n=== 🏆 FINAL RESULT ===");
    println!("Score: {}", best.score);
    println!("Cycles: {}", handle.cycles());
    reports::print_key_table(&key);
    reports::print_decryption(&decryption);
    Ok(())
}
