use crate::config::LanguageParams;
use crate::consts::{SPACE_LABEL, UNASSIGNED};
use crate::key::KeyStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TokenKind {
    /// A position whose plaintext is searched for.
    Homophone,
    /// A position with a fixed or ignored plaintext value.
    Other,
    /// End of a transcribed line. Breaks n-gram context.
    NewLine,
}

/// One position of ciphertext or reference plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Ciphertext symbol label (empty for reference tokens).
    pub c: String,
    /// Plaintext label (empty until known).
    pub p: String,
    /// Position of the label in the relevant alphabet, or `UNASSIGNED`.
    pub index: i32,
}

impl Token {
    pub fn reference(p: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Homophone,
            c: String::new(),
            p: p.into(),
            index: UNASSIGNED,
        }
    }

    pub fn cipher(c: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Homophone,
            c: c.into(),
            p: String::new(),
            index: UNASSIGNED,
        }
    }

    pub fn other(c: impl Into<String>, p: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Other,
            c: c.into(),
            p: p.into(),
            index: UNASSIGNED,
        }
    }

    pub fn newline() -> Self {
        Self {
            kind: TokenKind::NewLine,
            c: String::new(),
            p: String::new(),
            index: UNASSIGNED,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.index != UNASSIGNED
    }
}

/// Sorted list of distinct labels (`pList`), or distinct symbols in order of
/// appearance (`cList`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    labels: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl Alphabet {
    pub fn new(labels: Vec<String>) -> Self {
        let lookup = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Self { labels, lookup }
    }

    /// Sorted distinct plaintext labels of a reference stream.
    pub fn plaintext(tokens: &[Token]) -> Self {
        let mut labels: Vec<String> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Homophone && !t.p.is_empty())
            .map(|t| t.p.clone())
            .collect();
        labels.sort();
        labels.dedup();
        Self::new(labels)
    }

    /// Distinct homophone symbols in first-appearance order.
    pub fn ciphertext(tokens: &[Token]) -> Self {
        let mut labels = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for t in tokens.iter().filter(|t| t.kind == TokenKind::Homophone) {
            if seen.insert(t.c.as_str()) {
                labels.push(t.c.clone());
            }
        }
        Self::new(labels)
    }

    #[inline]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.lookup.get(label).copied()
    }

    #[inline]
    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Turns a raw corpus into reference tokens following the language rules.
pub fn tokenize_reference(text: &str, params: &LanguageParams) -> Vec<Token> {
    let normalized = params.language.normalize(text);
    let merges = params.merges();
    let merged: Vec<char> = normalized
        .chars()
        .map(|ch| {
            merges
                .iter()
                .find(|m| m.from_char() == ch)
                .map_or(ch, |m| m.to_char())
        })
        .collect();

    let mut digraphs: Vec<Vec<char>> = params
        .digraph_list()
        .iter()
        .map(|d| d.chars().collect())
        .collect();
    // Longest units first so "sch" wins over "sc".
    digraphs.sort_by_key(|d| std::cmp::Reverse(d.len()));

    let mut tokens: Vec<Token> = Vec::with_capacity(merged.len());
    let mut i = 0;
    while i < merged.len() {
        if merged[i] == ' ' {
            i += 1;
            if !params.remove_spaces {
                tokens.push(Token::reference(SPACE_LABEL));
            }
            continue;
        }

        let unit = digraphs
            .iter()
            .find(|d| merged[i..].starts_with(d))
            .map(|d| d.iter().collect::<String>())
            .unwrap_or_else(|| merged[i].to_string());
        i += unit.chars().count();

        if params.collapse_doubles && tokens.last().is_some_and(|t| t.p == unit) {
            continue;
        }
        tokens.push(Token::reference(unit));
    }
    tokens
}

/// Sets `index` of every reference token to its plaintext alphabet position.
pub fn resolve_reference(tokens: &mut [Token], alphabet: &Alphabet) {
    for t in tokens.iter_mut() {
        t.index = alphabet.index_of(&t.p).map_or(UNASSIGNED, |i| i as i32);
    }
}

/// Maps a key-store plaintext value onto the plaintext alphabet, applying the
/// same normalization as the reference corpus.
pub fn assignable_label(value: &str, params: &LanguageParams, alphabet: &Alphabet) -> Option<usize> {
    if let Some(idx) = alphabet.index_of(value) {
        return Some(idx);
    }
    let tokens = tokenize_reference(value, params);
    match tokens.as_slice() {
        [single] => alphabet.index_of(&single.p),
        _ => None,
    }
}

/// Builds ciphertext tokens from transcribed lines.
///
/// Rare symbols and locked symbols whose plaintext is not an alphabet label
/// become `Other`. A rare symbol keeps the value of its locked key entry, if
/// any. A `NewLine` token closes every line.
pub fn tokenize_cipher(
    lines: &[Vec<String>],
    params: &LanguageParams,
    key: &KeyStore,
    alphabet: &Alphabet,
) -> Vec<Token> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in lines.iter().flatten() {
        *counts.entry(label.as_str()).or_default() += 1;
    }

    let mut tokens = Vec::with_capacity(counts.values().sum::<usize>() + lines.len());
    for line in lines {
        for label in line {
            let locked = if params.ignore_current_key {
                None
            } else {
                key.locked(label)
            };
            let rare = counts[label.as_str()] < params.min_symbol_count;

            match locked {
                Some(p) if rare || assignable_label(p, params, alphabet).is_none() => {
                    tokens.push(Token::other(label.as_str(), p))
                }
                _ if rare => tokens.push(Token::other(label.as_str(), "")),
                _ => tokens.push(Token::cipher(label.as_str())),
            }
        }
        tokens.push(Token::newline());
    }
    tokens
}

/// Sets `index` of every homophone token to its symbol alphabet position.
pub fn resolve_cipher(tokens: &mut [Token], alphabet: &Alphabet) {
    for t in tokens.iter_mut() {
        t.index = match t.kind {
            TokenKind::Homophone => alphabet.index_of(&t.c).map_or(UNASSIGNED, |i| i as i32),
            _ => UNASSIGNED,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.p.as_str()).collect()
    }

    #[test]
    fn test_reference_keeps_spaces_as_label() {
        let tokens = tokenize_reference("The cat.", &LanguageParams::default());
        assert_eq!(labels(&tokens), "the_cat");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Homophone));
    }

    #[test]
    fn test_reference_merges_digraphs_and_doubles() {
        let params = LanguageParams {
            remove_spaces: true,
            collapse_doubles: true,
            digraphs: "ch,qu".into(),
            ..Default::default()
        };
        let tokens = tokenize_reference("Queen chess", &params);
        let p: Vec<&str> = tokens.iter().map(|t| t.p.as_str()).collect();
        assert_eq!(p, vec!["qu", "e", "n", "ch", "e", "s"]);
    }

    #[test]
    fn test_plaintext_alphabet_sorted() {
        let tokens = tokenize_reference("cab", &LanguageParams::default());
        let alphabet = Alphabet::plaintext(&tokens);
        assert_eq!(alphabet.labels(), &["a", "b", "c"]);
        assert_eq!(alphabet.index_of("c"), Some(2));
    }

    #[test]
    fn test_rare_symbol_keeps_locked_value() {
        let lines = vec![vec!["A".to_string(), "A".to_string(), "Q".to_string(), "R".to_string()]];
        let params = LanguageParams {
            min_symbol_count: 2,
            ..Default::default()
        };
        let key = KeyStore::parse("Q - E\nR - e\n").unwrap();
        let alphabet = Alphabet::new(vec!["e".into()]);
        let tokens = tokenize_cipher(&lines, &params, &key, &alphabet);

        assert_eq!(tokens[0].kind, TokenKind::Homophone);
        assert_eq!((tokens[2].kind, tokens[2].p.as_str()), (TokenKind::Other, "e"));
        // Unlocked guesses for rare symbols are dropped.
        assert_eq!((tokens[3].kind, tokens[3].p.as_str()), (TokenKind::Other, ""));
    }

    #[test]
    fn test_cipher_newlines_and_rare_symbols() {
        let lines = vec![
            vec!["A".to_string(), "B".to_string()],
            vec!["A".to_string(), "C".to_string()],
        ];
        let params = LanguageParams {
            min_symbol_count: 2,
            ..Default::default()
        };
        let alphabet = Alphabet::new(vec!["e".into()]);
        let mut tokens = tokenize_cipher(&lines, &params, &KeyStore::default(), &alphabet);
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Homophone,
                TokenKind::Other,
                TokenKind::NewLine,
                TokenKind::Homophone,
                TokenKind::Other,
                TokenKind::NewLine
            ]
        );

        let c_list = Alphabet::ciphertext(&tokens);
        resolve_cipher(&mut tokens, &c_list);
        assert_eq!(c_list.labels(), &["A"]);
        assert_eq!(tokens[0].index, 0);
        assert!(!tokens[1].is_resolved());
    }

    #[test]
    fn test_locked_reserved_value_becomes_other() {
        let key = KeyStore::parse("X - NULL\nY - E\n").unwrap();
        let lines = vec![vec!["X".to_string(), "Y".to_string()]];
        let alphabet = Alphabet::new(vec!["e".into()]);
        let tokens = tokenize_cipher(&lines, &LanguageParams::default(), &key, &alphabet);
        assert_eq!(tokens[0].kind, TokenKind::Other);
        assert_eq!(tokens[0].p, "null");
        assert_eq!(tokens[1].kind, TokenKind::Homophone);
    }
}
