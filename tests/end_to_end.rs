use cipherforge::config::LanguageParams;
use cipherforge::key::KeyStore;
use cipherforge::optimizer::runner::SharedState;
use cipherforge::optimizer::Worker;
use cipherforge::problem::ProblemParams;
use std::collections::HashMap;
use std::sync::Arc;

const PLAINTEXT: &str = "thecatsat";

fn true_key() -> HashMap<char, &'static str> {
    HashMap::from([
        ('t', "01"),
        ('h', "02"),
        ('e', "03"),
        ('c', "04"),
        ('a', "05"),
        ('s', "06"),
    ])
}

fn encrypt(text: &str) -> Vec<Vec<String>> {
    let key = true_key();
    vec![text.chars().map(|ch| key[&ch].to_string()).collect()]
}

#[test]
fn test_recovers_known_mapping() {
    let problem = ProblemParams::builder()
        .language(LanguageParams {
            ngram_order: 4,
            max_homophones: 1,
            remove_spaces: true,
            ignore_current_key: true,
            ..Default::default()
        })
        .corpus(format!("{} ", PLAINTEXT).repeat(30))
        .lines(encrypt(&PLAINTEXT.repeat(5)))
        .build()
        .build_problem()
        .unwrap();
    let problem = Arc::new(problem);

    let shared = Arc::new(SharedState::new(32));
    shared.start();
    let mut worker = Worker::new(0, problem.clone(), shared.clone(), Some(42), 20, 1e5, 5e6);

    let expected: HashMap<&str, String> = true_key()
        .into_iter()
        .map(|(p, c)| (c, p.to_string()))
        .collect();

    let mut solved = false;
    for _ in 0..200 {
        assert!(worker.run_cycle());
        let best = shared.best_snapshot().expect("a snapshot is published");
        let key = KeyStore::parse(&best.key).unwrap();
        solved = expected
            .iter()
            .all(|(c, p)| key.get(c).map(|e| &e.plaintext) == Some(p));
        if solved {
            break;
        }
    }
    assert!(solved, "best key: {:?}", shared.best_key());

    let key = KeyStore::parse(&shared.best_key().unwrap()).unwrap();
    let c_to_p = problem.assignment_from_key(&key);
    assert_eq!(problem.decrypt(&c_to_p).trim_end(), PLAINTEXT.repeat(5));
    assert_eq!(
        problem.scorer().score(&c_to_p),
        shared.best_score(),
        "published score belongs to the published key"
    );
}

#[test]
fn test_seeded_workers_are_reproducible() {
    let build = || {
        Arc::new(
            ProblemParams::builder()
                .language(LanguageParams {
                    ngram_order: 4,
                    max_homophones: 1,
                    remove_spaces: true,
                    ..Default::default()
                })
                .corpus(PLAINTEXT.repeat(30))
                .lines(encrypt(&PLAINTEXT.repeat(3)))
                .build()
                .build_problem()
                .unwrap(),
        )
    };

    let run = || {
        let shared = Arc::new(SharedState::new(8));
        shared.start();
        let mut worker = Worker::new(0, build(), shared.clone(), Some(7), 5, 1e5, 1e6);
        for _ in 0..3 {
            worker.run_cycle();
        }
        (shared.best_score(), shared.best_key())
    };

    assert_eq!(run(), run());
}
