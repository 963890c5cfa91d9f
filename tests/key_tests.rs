use cipherforge::error::CipherForgeError;
use cipherforge::key::{KeyEntry, KeyStore};
use regex::Regex;
use tempfile::tempdir;

const KEY: &str = "\
# partial key
12|07 - e
33 - T
99|4a - NULL
";

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("key.txt");

    let key = KeyStore::parse(KEY).unwrap();
    key.save_to_file(&path).unwrap();
    let reloaded = KeyStore::load_from_file(&path).unwrap();

    assert_eq!(reloaded.to_text(), key.to_text());
    assert_eq!(reloaded.len(), 5);
    assert_eq!(reloaded.locked("33"), Some("t"));
    assert_eq!(reloaded.locked("4a"), Some("null"));
    assert_eq!(reloaded.locked("12"), None);
}

#[test]
fn test_output_shape() {
    let mut key = KeyStore::default();
    for (symbol, plaintext, locked) in [("a1", "e", false), ("a2", "e", false), ("b1", "t", true)] {
        key.insert(KeyEntry {
            symbol: symbol.into(),
            plaintext: plaintext.into(),
            locked,
        });
    }
    let text = key.to_text();
    let line = Regex::new(r"^(\S+)(\|\S+)* - (\S+)$").unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["a1|a2 - e", "b1 - T"]);
    assert!(lines.iter().all(|l| line.is_match(l)));
}

#[test]
fn test_insert_replaces_symbol() {
    let mut key = KeyStore::parse("x - a\n").unwrap();
    key.insert(KeyEntry {
        symbol: "x".into(),
        plaintext: "b".into(),
        locked: true,
    });
    assert_eq!(key.len(), 1);
    assert_eq!(key.to_text(), "x - B\n");
}

#[test]
fn test_bad_line_is_reported() {
    let err = KeyStore::parse("a - e\n\nb|c e\n").unwrap_err();
    match err {
        CipherForgeError::KeyFormat { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected {}", other),
    }
    assert!(matches!(
        KeyStore::parse("a| - e"),
        Err(CipherForgeError::KeyFormat { line: 1, .. })
    ));
}
