use cipherforge::config::Config;
use cipherforge::error::CipherForgeError;
use cipherforge::language::Language;
use clap::{Args, CommandFactory, FromArgMatches, Parser};
use std::fs;
use tempfile::tempdir;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    config: Config,
}

fn parse(args: &[&str]) -> (Config, clap::ArgMatches) {
    let matches = TestCli::command().get_matches_from(args);
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    (cli.config, matches)
}

#[test]
fn test_partial_json_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "language": { "language": "latin", "ngram_order": 6 }, "search": { "rounds": 40 } }"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.language.language, Language::Latin);
    assert_eq!(config.language.ngram_order, 6);
    assert_eq!(config.language.max_homophones, 4);
    assert_eq!(config.search.rounds, 40);
    assert_eq!(config.search.temp_max, 1_000_000.0);
}

#[test]
fn test_cli_overrides_only_explicit_flags() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "language": { "max_homophones": 6, "lock_length": 8 }, "search": { "rounds": 40 } }"#,
    )
    .unwrap();

    let (cli, matches) = parse(&["test", "--rounds", "99", "--merge-j-i", "--language", "german"]);
    let mut config = Config::load_from_file(&path).unwrap();
    config.merge_from_cli(&cli, &matches);

    assert_eq!(config.search.rounds, 99);
    assert!(config.language.merge_j_i);
    assert_eq!(config.language.language, Language::German);
    // Untouched on the command line: file values survive.
    assert_eq!(config.language.max_homophones, 6);
    assert_eq!(config.language.lock_length, 8);
}

#[test]
fn test_defaults_match_between_clap_and_serde() {
    let (cli, _) = parse(&["test"]);
    let json: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(
        serde_json::to_value(&cli).unwrap(),
        serde_json::to_value(&json).unwrap()
    );
    assert!(Config::augment_args(clap::Command::new("x"))
        .get_arguments()
        .any(|a| a.get_id().as_str() == "ngram_order"));
}

#[test]
fn test_validation_errors() {
    let (mut config, _) = parse(&["test", "--ngram-order", "3"]);
    assert!(matches!(
        config.language.validate(),
        Err(CipherForgeError::UnsupportedOrder(3))
    ));

    config.language.ngram_order = 5;
    config.language.max_homophones = 8;
    assert!(matches!(
        config.language.validate(),
        Err(CipherForgeError::Config(_))
    ));

    config.search.temp_min = 10.0;
    config.search.temp_max = 1.0;
    assert!(config.search.validate().is_err());
}

#[test]
fn test_bad_json_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ nope").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(CipherForgeError::Json(_))
    ));
}
