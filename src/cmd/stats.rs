use super::Inputs;
use crate::reports;
use cipherforge::config::Config;
use cipherforge::error::CfResult;
use cipherforge::problem::ProblemParams;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub config: Config,

    /// Rows shown in the n-gram and symbol tables.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

pub fn run(args: &StatsArgs, config: &Config, inputs: Inputs) -> CfResult<()> {
    let problem = ProblemParams::builder()
        .language(config.language.clone())
        .corpus(inputs.corpus)
        .lines(inputs.lines)
        .key(inputs.key)
        .build()
        .build_problem()?;

    reports::print_languages(config.language.language);
    reports::print_alphabet(&problem);
    reports::print_symbol_counts(&problem, args.top);
    reports::print_top_ngrams(&problem, args.top);
    Ok(())
}
