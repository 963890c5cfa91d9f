use crate::consts::{MAX_HOMOPHONES_LIMIT, SUPPORTED_ORDERS};
use crate::error::{CfResult, CipherForgeError};
use crate::language::{Language, LetterMerge};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub language: LanguageParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Rounds per annealing cycle.
    #[arg(long, default_value_t = 250)]
    pub rounds: usize,
    #[arg(long, default_value_t = 100_000.0)]
    pub temp_min: f64,
    #[arg(long, default_value_t = 1_000_000.0)]
    pub temp_max: f64,
    /// Upper bound on worker threads (defaults to available parallelism).
    #[arg(long)]
    pub max_workers: Option<usize>,
    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
    /// Number of key snapshots kept for progressive display.
    #[arg(long, default_value_t = 100)]
    pub snapshot_capacity: usize,
    /// How long `stop` waits for workers to exit.
    #[arg(long, default_value_t = 500)]
    pub stop_wait_ms: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            rounds: 250,
            temp_min: 100_000.0,
            temp_max: 1_000_000.0,
            max_workers: None,
            seed: None,
            snapshot_capacity: 100,
            stop_wait_ms: 500,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageParams {
    #[arg(long, default_value = "english")]
    pub language: Language,

    // === Letter merges ===
    #[arg(long, default_value_t = false)]
    pub merge_u_v: bool,
    #[arg(long, default_value_t = false)]
    pub merge_w_v: bool,
    #[arg(long, default_value_t = false)]
    pub merge_j_i: bool,
    #[arg(long, default_value_t = false)]
    pub merge_y_i: bool,
    #[arg(long, default_value_t = false)]
    pub merge_z_s: bool,
    #[arg(long, default_value_t = false)]
    pub merge_k_c: bool,

    // === Corpus shaping ===
    #[arg(long, default_value_t = false)]
    pub collapse_doubles: bool,
    #[arg(long, default_value_t = false)]
    pub remove_spaces: bool,
    /// Comma separated multi-letter plaintext units, e.g. "ch,qu".
    #[arg(long, default_value = "")]
    pub digraphs: String,

    // === Model ===
    #[arg(long, default_value_t = 5)]
    pub ngram_order: usize,
    #[arg(long, default_value_t = 4)]
    pub max_homophones: usize,
    /// Symbols seen fewer times than this are left out of the search.
    #[arg(long, default_value_t = 1)]
    pub min_symbol_count: usize,
    /// Window length for reference locking (0 disables locking).
    #[arg(long, default_value_t = 12)]
    pub lock_length: usize,
    #[arg(long, default_value_t = false)]
    pub ignore_current_key: bool,
}

impl Default for LanguageParams {
    fn default() -> Self {
        Self {
            language: Language::English,
            merge_u_v: false,
            merge_w_v: false,
            merge_j_i: false,
            merge_y_i: false,
            merge_z_s: false,
            merge_k_c: false,
            collapse_doubles: false,
            remove_spaces: false,
            digraphs: String::new(),
            ngram_order: 5,
            max_homophones: 4,
            min_symbol_count: 1,
            lock_length: 12,
            ignore_current_key: false,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overlays the values that were given explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident, $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(search, rounds);
        update_if_present!(search, temp_min);
        update_if_present!(search, temp_max);
        update_if_present!(search, max_workers);
        update_if_present!(search, seed);
        update_if_present!(search, snapshot_capacity);
        update_if_present!(search, stop_wait_ms);

        update_if_present!(language, language);
        update_if_present!(language, merge_u_v);
        update_if_present!(language, merge_w_v);
        update_if_present!(language, merge_j_i);
        update_if_present!(language, merge_y_i);
        update_if_present!(language, merge_z_s);
        update_if_present!(language, merge_k_c);
        update_if_present!(language, collapse_doubles);
        update_if_present!(language, remove_spaces);
        update_if_present!(language, digraphs);
        update_if_present!(language, ngram_order);
        update_if_present!(language, max_homophones);
        update_if_present!(language, min_symbol_count);
        update_if_present!(language, lock_length);
        update_if_present!(language, ignore_current_key);
    }
}

impl LanguageParams {
    /// Built-in language merges plus the enabled toggles.
    pub fn merges(&self) -> Vec<LetterMerge> {
        let mut merges = self.language.builtin_merges().to_vec();
        let toggles = [
            (self.merge_u_v, LetterMerge::UtoV),
            (self.merge_w_v, LetterMerge::WtoV),
            (self.merge_j_i, LetterMerge::JtoI),
            (self.merge_y_i, LetterMerge::YtoI),
            (self.merge_z_s, LetterMerge::ZtoS),
            (self.merge_k_c, LetterMerge::KtoC),
        ];
        for (enabled, merge) in toggles {
            if enabled && !merges.contains(&merge) {
                merges.push(merge);
            }
        }
        merges
    }

    pub fn digraph_list(&self) -> Vec<String> {
        self.digraphs
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| s.chars().count() > 1)
            .collect()
    }

    pub fn lock_length(&self) -> Option<usize> {
        (self.lock_length > 0).then_some(self.lock_length)
    }

    pub fn validate(&self) -> CfResult<()> {
        if !SUPPORTED_ORDERS.contains(&self.ngram_order) {
            return Err(CipherForgeError::UnsupportedOrder(self.ngram_order));
        }
        if self.max_homophones == 0 || self.max_homophones > MAX_HOMOPHONES_LIMIT {
            return Err(CipherForgeError::Config(format!(
                "max_homophones must be between 1 and {}, got {}",
                MAX_HOMOPHONES_LIMIT, self.max_homophones
            )));
        }
        Ok(())
    }
}

impl SearchParams {
    pub fn validate(&self) -> CfResult<()> {
        if self.rounds == 0 {
            return Err(CipherForgeError::Config("rounds must be positive".into()));
        }
        if self.temp_min < 0.0 || self.temp_max < self.temp_min {
            return Err(CipherForgeError::Config(format!(
                "invalid temperature range {}..{}",
                self.temp_min, self.temp_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_merges_are_builtin() {
        let params = LanguageParams {
            language: Language::Latin,
            merge_u_v: true,
            merge_k_c: true,
            ..Default::default()
        };
        let merges = params.merges();
        assert_eq!(merges.len(), 3);
        assert!(merges.contains(&LetterMerge::JtoI));
        assert!(merges.contains(&LetterMerge::KtoC));
    }

    #[test]
    fn test_digraph_list_ignores_single_letters() {
        let params = LanguageParams {
            digraphs: "ch, QU ,x,".into(),
            ..Default::default()
        };
        assert_eq!(params.digraph_list(), vec!["ch", "qu"]);
    }

    #[test]
    fn test_lock_length_zero_disables() {
        let params = LanguageParams {
            lock_length: 0,
            ..Default::default()
        };
        assert_eq!(params.lock_length(), None);
    }
}
