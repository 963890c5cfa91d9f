//! Textual key format: one line per plaintext group, `H1|H2|...|Hn - P`.
//! An upper-case `P` marks the group as locked.

use crate::error::{CfResult, CipherForgeError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const GROUP_SEPARATOR: &str = " - ";
const SYMBOL_SEPARATOR: &str = "|";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub symbol: String,
    pub plaintext: String,
    pub locked: bool,
}

/// Symbol-to-plaintext assignments in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStore {
    entries: Vec<KeyEntry>,
    lookup: HashMap<String, usize>,
}

impl KeyStore {
    pub fn parse(text: &str) -> CfResult<Self> {
        let mut store = KeyStore::default();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (symbols, plaintext) =
                line.rsplit_once(GROUP_SEPARATOR)
                    .ok_or_else(|| CipherForgeError::KeyFormat {
                        line: line_no + 1,
                        message: format!("missing '{}' in '{}'", GROUP_SEPARATOR.trim(), line),
                    })?;

            let plaintext = plaintext.trim();
            if plaintext.is_empty() {
                return Err(CipherForgeError::KeyFormat {
                    line: line_no + 1,
                    message: "empty plaintext".into(),
                });
            }
            let locked = plaintext.chars().any(char::is_uppercase)
                && !plaintext.chars().any(char::is_lowercase);

            for symbol in symbols.split(SYMBOL_SEPARATOR).map(str::trim) {
                if symbol.is_empty() {
                    return Err(CipherForgeError::KeyFormat {
                        line: line_no + 1,
                        message: "empty symbol label".into(),
                    });
                }
                store.insert(KeyEntry {
                    symbol: symbol.to_string(),
                    plaintext: plaintext.to_lowercase(),
                    locked,
                });
            }
        }
        Ok(store)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CfResult<()> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    /// Adds or replaces the entry for `entry.symbol`.
    pub fn insert(&mut self, entry: KeyEntry) {
        match self.lookup.get(&entry.symbol) {
            Some(&idx) => self.entries[idx] = entry,
            None => {
                self.lookup.insert(entry.symbol.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&KeyEntry> {
        self.lookup.get(symbol).map(|&i| &self.entries[i])
    }

    /// Plaintext of `symbol` if the key marks it as locked.
    pub fn locked(&self, symbol: &str) -> Option<&str> {
        self.get(symbol)
            .filter(|e| e.locked)
            .map(|e| e.plaintext.as_str())
    }

    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the key, one line per (plaintext, locked) group in order of
    /// first appearance. Plaintext without letters (the space label) cannot
    /// carry the lock marker, so its locked and unlocked symbols share a line.
    pub fn to_text(&self) -> String {
        let mut groups: Vec<((&str, bool), Vec<&str>)> = Vec::new();
        for e in &self.entries {
            let locked = e.locked && e.plaintext.chars().any(char::is_lowercase);
            let group = (e.plaintext.as_str(), locked);
            match groups.iter_mut().find(|(g, _)| *g == group) {
                Some((_, symbols)) => symbols.push(&e.symbol),
                None => groups.push((group, vec![&e.symbol])),
            }
        }

        groups
            .into_iter()
            .map(|((plaintext, locked), symbols)| {
                let p = if locked {
                    plaintext.to_uppercase()
                } else {
                    plaintext.to_string()
                };
                format!(
                    "{}{}{}\n",
                    symbols.iter().join(SYMBOL_SEPARATOR),
                    GROUP_SEPARATOR,
                    p
                )
            })
            .collect()
    }
}
