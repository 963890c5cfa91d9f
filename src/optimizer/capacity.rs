use crate::consts::{HOMOPHONE_QUOTAS, MAX_HOMOPHONES_LIMIT, SPACE_LABEL};
use crate::language::Language;
use crate::token::Alphabet;

/// Maximum number of ciphertext symbols per plaintext label.
///
/// Single letters are ranked (space first, then the language priority order,
/// then the rest alphabetically) and handed group sizes from the quota row for
/// `max_homophones`. Multi-letter labels always get one.
pub fn homophone_capacities(
    p_list: &Alphabet,
    language: Language,
    max_homophones: usize,
) -> Vec<usize> {
    let max_h = max_homophones.clamp(1, MAX_HOMOPHONES_LIMIT);
    let mut capacities = vec![1; p_list.len()];

    let ranked = priority_ranking(p_list, language);
    let mut ranked = ranked.into_iter();
    for (step, &quota) in HOMOPHONE_QUOTAS[max_h - 1].iter().enumerate() {
        let size = max_h - step;
        for p in ranked.by_ref().take(quota) {
            capacities[p] = size;
        }
    }
    capacities
}

fn priority_ranking(p_list: &Alphabet, language: Language) -> Vec<usize> {
    let mut ranked: Vec<usize> = Vec::with_capacity(p_list.len());
    if let Some(space) = p_list.index_of(SPACE_LABEL) {
        ranked.push(space);
    }
    let mut buf = [0u8; 4];
    for ch in language.priority().chars() {
        if let Some(p) = p_list.index_of(ch.encode_utf8(&mut buf)) {
            ranked.push(p);
        }
    }
    for (p, label) in p_list.labels().iter().enumerate() {
        if label.chars().count() == 1 && !ranked.contains(&p) {
            ranked.push(p);
        }
    }
    ranked
}
