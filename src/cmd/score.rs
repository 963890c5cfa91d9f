use super::Inputs;
use crate::reports;
use cipherforge::config::Config;
use cipherforge::error::{CfResult, CipherForgeError};
use cipherforge::problem::ProblemParams;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub config: Config,
}

pub fn run(config: &Config, inputs: Inputs) -> CfResult<()> {
    if inputs.key.is_empty() {
        return Err(CipherForgeError::Validation(
            "score needs a key file (--key)".into(),
        ));
    }

    let problem = ProblemParams::builder()
        .language(config.language.clone())
        .corpus(inputs.corpus)
        .lines(inputs.lines)
        .key(inputs.key.clone())
        .build()
        .build_problem()?;

    let c_to_p = problem.assignment_from_key(&inputs.key);
    let details = problem.scorer().score_details(&c_to_p);

    reports::print_score_details("Key", &details);
    reports::print_key_table(&problem.key_store(&c_to_p, &problem.forced));
    reports::print_decryption(&problem.decrypt(&c_to_p));
    Ok(())
}
