use cipherforge::config::Config;
use cipherforge::error::CfResult;
use cipherforge::key::KeyStore;
use cipherforge::loader;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::{debug, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reference plaintext corpus.
    #[arg(global = true, long, default_value = "data/corpus/english.txt")]
    corpus: String,

    /// Transcribed ciphertext, one line per row.
    #[arg(global = true, short = 'c', long, default_value = "data/cipher.txt")]
    cipher: String,

    /// Existing key file (`H1|H2 - p` lines).
    #[arg(global = true, short = 'k', long)]
    key: Option<String>,

    /// JSON configuration; explicit command line flags override it.
    #[arg(global = true, long)]
    config: Option<String>,

    /// Symbol separator in the transcription: space, tab, comma or one character.
    #[arg(global = true, long, default_value = "space")]
    delimiter: String,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for a key.
    Solve(cmd::solve::SolveArgs),
    /// Score the key given with --key.
    Score(cmd::score::ScoreArgs),
    /// Show alphabet, capacities and reference statistics.
    Stats(cmd::stats::StatsArgs),
}

fn main() {
    // Raw matches tell explicit flags apart from defaults.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    if let Err(e) = run(&cli, &matches) {
        eprintln!("\n❌ {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli, matches: &ArgMatches) -> CfResult<()> {
    let (cli_config, sub_matches) = match (&cli.command, matches.subcommand()) {
        (Commands::Solve(args), Some((_, m))) => (&args.config, m),
        (Commands::Score(args), Some((_, m))) => (&args.config, m),
        (Commands::Stats(args), Some((_, m))) => (&args.config, m),
        (_, None) => unreachable!("clap requires a subcommand"),
    };

    let config = match &cli.config {
        Some(path) => {
            debug!("Loading config from {}", path);
            let mut config = Config::load_from_file(path)?;
            config.merge_from_cli(cli_config, sub_matches);
            config
        }
        None => cli_config.clone(),
    };
    config.language.validate()?;

    println!("📂 Loading corpus: {}", cli.corpus);
    let corpus = loader::load_corpus(&cli.corpus)?;
    println!("📂 Loading ciphertext: {}", cli.cipher);
    let delimiter = loader::parse_delimiter(&cli.delimiter)?;
    let lines = loader::load_transcription_from_file(&cli.cipher, delimiter)?;
    let key = match &cli.key {
        Some(path) => {
            println!("📂 Loading key: {}", path);
            KeyStore::load_from_file(path)?
        }
        None => KeyStore::default(),
    };

    let inputs = cmd::Inputs { corpus, lines, key };
    match &cli.command {
        Commands::Solve(args) => cmd::solve::run(args, &config, inputs),
        Commands::Score(_) => cmd::score::run(&config, inputs),
        Commands::Stats(args) => cmd::stats::run(args, &config, inputs),
    }
}
