use crate::config::LanguageParams;
use crate::consts::{SPACE_LABEL, UNASSIGNED};
use crate::error::{CfResult, CipherForgeError};
use crate::key::{KeyEntry, KeyStore};
use crate::optimizer::capacity::homophone_capacities;
use crate::optimizer::locking::ReferenceLocks;
use crate::optimizer::mutation::homophone_counts;
use crate::scorer::{Cell, NgramTable, Scorer};
use crate::token::{self, Alphabet, Token, TokenKind};
use std::sync::Arc;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

/// Inputs of a solve: language rules, raw reference corpus, transcribed
/// ciphertext lines and the current key.
#[derive(TypedBuilder)]
pub struct ProblemParams {
    #[builder(default)]
    pub language: LanguageParams,
    #[builder(setter(into))]
    pub corpus: String,
    pub lines: Vec<Vec<String>>,
    #[builder(default)]
    pub key: KeyStore,
}

impl ProblemParams {
    /// Runs every setup step and fatal check. Nothing here is shared mutable.
    pub fn build_problem(self) -> CfResult<Problem> {
        let params = self.language;
        params.validate()?;

        let mut reference = token::tokenize_reference(&self.corpus, &params);
        if reference.is_empty() {
            return Err(CipherForgeError::EmptyCorpus);
        }
        let p_list = Alphabet::plaintext(&reference);
        if p_list.is_empty() {
            return Err(CipherForgeError::EmptyCorpus);
        }
        token::resolve_reference(&mut reference, &p_list);
        let indices: Vec<i32> = reference.iter().map(|t| t.index).collect();

        let table = NgramTable::build(&indices, p_list.len(), params.ngram_order)?;
        debug!(
            "N-gram table: order {}, {} labels, {} non-zero of {} cells",
            table.order(),
            table.dim(),
            table.non_zero(),
            table.len()
        );

        let mut cipher = token::tokenize_cipher(&self.lines, &params, &self.key, &p_list);
        let c_list = Alphabet::ciphertext(&cipher);
        if c_list.is_empty() {
            return Err(CipherForgeError::EmptyCiphertext);
        }
        token::resolve_cipher(&mut cipher, &c_list);

        let cells: Arc<[Cell]> = cipher
            .iter()
            .map(|t| match t.kind {
                TokenKind::Homophone if t.is_resolved() => Cell::Symbol(t.index as usize),
                TokenKind::Other => token::assignable_label(&t.p, &params, &p_list)
                    .map_or(Cell::Gap, Cell::Fixed),
                _ => Cell::Gap,
            })
            .collect();

        let mut forced = vec![UNASSIGNED; c_list.len()];
        if !params.ignore_current_key {
            for (c, symbol) in c_list.labels().iter().enumerate() {
                if let Some(p) = self
                    .key
                    .locked(symbol)
                    .and_then(|value| token::assignable_label(value, &params, &p_list))
                {
                    forced[c] = p as i32;
                }
            }
        }

        // Locked key entries may exceed the computed quota for their letter.
        let mut capacities =
            homophone_capacities(&p_list, params.language, params.max_homophones);
        let forced_counts = homophone_counts(&forced, p_list.len());
        for (cap, &n) in capacities.iter_mut().zip(&forced_counts) {
            *cap = (*cap).max(n);
        }

        let assignable: usize = capacities.iter().sum();
        if c_list.len() > assignable {
            return Err(CipherForgeError::CapacityExceeded {
                assignable,
                required: c_list.len(),
            });
        }

        let multi_letter: Vec<bool> = p_list
            .labels()
            .iter()
            .map(|l| l.chars().count() > 1)
            .collect();

        let locks = params
            .lock_length()
            .map(|length| ReferenceLocks::build(&indices, &multi_letter, length));

        info!(
            "Problem ready: {} reference tokens, {} plaintext labels, {} symbol types, {} forced, capacity {}",
            indices.len(),
            p_list.len(),
            c_list.len(),
            forced.iter().filter(|&&p| p != UNASSIGNED).count(),
            assignable
        );

        Ok(Problem {
            params,
            p_list,
            c_list,
            cipher,
            cells,
            table: Arc::new(table),
            capacities,
            multi_letter,
            forced,
            locks,
            reference_len: indices.len(),
        })
    }
}

/// Read-only state shared by all workers of one solve.
#[derive(Debug)]
pub struct Problem {
    pub params: LanguageParams,
    pub p_list: Alphabet,
    pub c_list: Alphabet,
    pub cipher: Vec<Token>,
    pub cells: Arc<[Cell]>,
    pub table: Arc<NgramTable>,
    pub capacities: Vec<usize>,
    pub multi_letter: Vec<bool>,
    /// Assignments seeded from locked key entries.
    pub forced: Vec<i32>,
    pub locks: Option<ReferenceLocks>,
    pub reference_len: usize,
}

impl Problem {
    pub fn scorer(&self) -> Scorer {
        Scorer::new(self.table.clone(), self.cells.clone())
    }

    pub fn assignable_capacity(&self) -> usize {
        self.capacities.iter().sum()
    }

    /// Key for `c_to_p`, grouped by plaintext label in alphabet order. Symbols
    /// whose entry in `forced` matches their assignment are marked locked.
    pub fn key_store(&self, c_to_p: &[i32], forced: &[i32]) -> KeyStore {
        let mut store = KeyStore::default();
        for (p, label) in self.p_list.labels().iter().enumerate() {
            for locked in [false, true] {
                for (c, symbol) in self.c_list.labels().iter().enumerate() {
                    if c_to_p[c] != p as i32 {
                        continue;
                    }
                    if (forced[c] == c_to_p[c]) != locked {
                        continue;
                    }
                    store.insert(KeyEntry {
                        symbol: symbol.clone(),
                        plaintext: label.clone(),
                        locked,
                    });
                }
            }
        }

        // Symbols kept out of the search but pinned by the key.
        for (t, cell) in self.cipher.iter().zip(self.cells.iter()) {
            if t.kind != TokenKind::Other || t.p.is_empty() || store.get(&t.c).is_some() {
                continue;
            }
            let plaintext = match *cell {
                Cell::Fixed(p) => self.p_list.label(p).to_string(),
                _ => t.p.clone(),
            };
            store.insert(KeyEntry {
                symbol: t.c.clone(),
                plaintext,
                locked: true,
            });
        }
        store
    }

    pub fn format_key(&self, c_to_p: &[i32], forced: &[i32]) -> String {
        self.key_store(c_to_p, forced).to_text()
    }

    /// Plaintext rendering of the ciphertext: `?` for unassigned symbols,
    /// `.` for ignored ones, one output line per transcribed line.
    pub fn decrypt(&self, c_to_p: &[i32]) -> String {
        let mut out = String::with_capacity(self.cipher.len());
        for (t, cell) in self.cipher.iter().zip(self.cells.iter()) {
            match (t.kind, *cell) {
                (TokenKind::NewLine, _) => out.push('\n'),
                (TokenKind::Other, Cell::Fixed(p)) => self.push_label(&mut out, p),
                (TokenKind::Other, _) if t.p.is_empty() => out.push('.'),
                (TokenKind::Other, _) => out.push_str(&t.p),
                (TokenKind::Homophone, _) => match c_to_p.get(t.index as usize) {
                    Some(&p) if t.is_resolved() && p != UNASSIGNED => {
                        self.push_label(&mut out, p as usize)
                    }
                    _ => out.push('?'),
                },
            }
        }
        out
    }

    fn push_label(&self, out: &mut String, p: usize) {
        let label = self.p_list.label(p);
        if label == SPACE_LABEL {
            out.push(' ');
        } else {
            out.push_str(label);
        }
    }

    /// Assignment read from a key; symbols without an assignable entry stay
    /// `UNASSIGNED`.
    pub fn assignment_from_key(&self, key: &KeyStore) -> Vec<i32> {
        self.c_list
            .labels()
            .iter()
            .map(|symbol| {
                key.get(symbol)
                    .and_then(|e| token::assignable_label(&e.plaintext, &self.params, &self.p_list))
                    .map_or(UNASSIGNED, |p| p as i32)
            })
            .collect()
    }
}
