use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Plaintext languages with built-in normalization rules.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    English,
    German,
    French,
    Italian,
    Spanish,
    Portuguese,
    Dutch,
    Latin,
}

/// Optional letter merges applied to the reference corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum LetterMerge {
    #[strum(serialize = "u->v")]
    UtoV,
    #[strum(serialize = "w->v")]
    WtoV,
    #[strum(serialize = "j->i")]
    JtoI,
    #[strum(serialize = "y->i")]
    YtoI,
    #[strum(serialize = "z->s")]
    ZtoS,
    #[strum(serialize = "k->c")]
    KtoC,
}

impl LetterMerge {
    pub fn from_char(self) -> char {
        match self {
            LetterMerge::UtoV => 'u',
            LetterMerge::WtoV => 'w',
            LetterMerge::JtoI => 'j',
            LetterMerge::YtoI => 'y',
            LetterMerge::ZtoS => 'z',
            LetterMerge::KtoC => 'k',
        }
    }

    pub fn to_char(self) -> char {
        match self {
            LetterMerge::UtoV | LetterMerge::WtoV => 'v',
            LetterMerge::JtoI | LetterMerge::YtoI => 'i',
            LetterMerge::ZtoS => 's',
            LetterMerge::KtoC => 'c',
        }
    }
}

impl Language {
    /// Letters ordered by how readily they take extra homophones: vowels and
    /// high-frequency consonants first.
    pub fn priority(self) -> &'static str {
        match self {
            Language::English => "etaoinshrdlcumwfgypbvkjxqz",
            Language::German => "enisratdhulcgmobwfkzpvjyxq",
            Language::French => "esaitnrulodcmpvqfbghjxyzkw",
            Language::Italian => "eaionltrscdupmvghfbqzjkwxy",
            Language::Spanish => "eaosrnidltcmupbgvyqhfzjxkw",
            Language::Portuguese => "aeosrimdntcuplvgqbfhzjxkwy",
            Language::Dutch => "enatirodslghvkmubpwjczfxyq",
            Language::Latin => "eiautsrnomcldpqbgvfhxyzkjw",
        }
    }

    /// Merges every corpus of this language gets regardless of toggles.
    pub fn builtin_merges(self) -> &'static [LetterMerge] {
        match self {
            Language::Latin => &[LetterMerge::JtoI, LetterMerge::UtoV],
            _ => &[],
        }
    }

    /// Lower-cases `text`, folds accented letters and keeps only `a..=z`.
    /// Every run of other characters collapses into a single space.
    pub fn normalize(self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pending_break = false;

        for ch in text.chars().flat_map(char::to_lowercase) {
            let start = out.len();
            self.fold_into(ch, &mut out);
            if out.len() == start {
                pending_break = true;
                continue;
            }
            if pending_break && start > 0 {
                out.insert(start, ' ');
            }
            pending_break = false;
        }
        out
    }

    fn fold_into(self, ch: char, out: &mut String) {
        if ch.is_ascii_lowercase() {
            out.push(ch);
            return;
        }
        if self == Language::German {
            match ch {
                'ä' => return out.push_str("ae"),
                'ö' => return out.push_str("oe"),
                'ü' => return out.push_str("ue"),
                _ => {}
            }
        }
        match ch {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
            'ç' => out.push('c'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ñ' => out.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_normalize_collapses_breaks() {
        let s = Language::English.normalize("Hello,  World!\nFoo");
        assert_eq!(s, "hello world foo");
    }

    #[test]
    fn test_german_umlauts_expand() {
        assert_eq!(Language::German.normalize("Größe"), "groesse");
        assert_eq!(Language::French.normalize("Été"), "ete");
    }

    #[test]
    fn test_language_parses_case_insensitive() {
        assert_eq!(Language::from_str("Latin").unwrap(), Language::Latin);
        assert!(Language::from_str("klingon").is_err());
    }

    #[test]
    fn test_merge_chars() {
        assert_eq!(LetterMerge::YtoI.from_char(), 'y');
        assert_eq!(LetterMerge::YtoI.to_char(), 'i');
        assert_eq!(LetterMerge::KtoC.from_char(), 'k');
    }

    #[test]
    fn test_priority_covers_alphabet() {
        for language in Language::iter() {
            let mut letters: Vec<char> = language.priority().chars().collect();
            letters.sort_unstable();
            letters.dedup();
            assert_eq!(letters.len(), 26, "{}", language);
            assert!(letters.iter().all(char::is_ascii_lowercase));
        }
    }
}
