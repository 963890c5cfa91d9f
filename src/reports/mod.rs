use cipherforge::consts::SPACE_LABEL;
use cipherforge::key::KeyStore;
use cipherforge::language::Language;
use cipherforge::problem::Problem;
use cipherforge::scorer::ScoreDetails;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use itertools::Itertools;
use std::collections::HashMap;
use strum::IntoEnumIterator;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, columns: std::ops::Range<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// One row per plaintext group of the key, locked groups highlighted.
pub fn print_key_table(key: &KeyStore) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Plaintext").add_attribute(Attribute::Bold),
        Cell::new("Symbols"),
        Cell::new("Count"),
        Cell::new("Locked"),
    ]);

    let groups = key
        .entries()
        .iter()
        .chunk_by(|e| (e.plaintext.clone(), e.locked));
    for ((plaintext, locked), group) in &groups {
        let symbols: Vec<&str> = group.map(|e| e.symbol.as_str()).collect();
        let label = if plaintext == SPACE_LABEL {
            "␣".to_string()
        } else {
            plaintext
        };
        let lock_cell = if locked {
            Cell::new("yes").fg(Color::Yellow)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new(symbols.join(" ")),
            Cell::new(symbols.len()),
            lock_cell,
        ]);
    }
    align_right(&mut table, 2..3);
    println!("\n{}", table);
}

pub fn print_score_details(title: &str, d: &ScoreDetails) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new(title).add_attribute(Attribute::Bold),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("N-grams"),
        Cell::new("Avg Weight"),
        Cell::new("Resolved"),
        Cell::new("IC"),
    ]);
    let avg = if d.ngram_count > 0 {
        d.ngram_sum as f64 / d.ngram_count as f64
    } else {
        0.0
    };
    table.add_row(vec![
        Cell::new(""),
        Cell::new(d.score).fg(Color::Cyan),
        Cell::new(d.ngram_count),
        Cell::new(format!("{:.1}", avg)),
        Cell::new(d.monogram_count),
        Cell::new(format!("{:.3}", d.ic)),
    ]);
    align_right(&mut table, 1..6);
    println!("\n{}", table);
}

pub fn print_decryption(text: &str) {
    println!("\n--- Decryption ---");
    for line in text.lines() {
        println!("{}", line);
    }
}

/// Built-in normalization of every supported language, active one marked.
pub fn print_languages(active: Language) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Language").add_attribute(Attribute::Bold),
        Cell::new("Merges"),
        Cell::new("Homophone Priority"),
    ]);
    for language in Language::iter() {
        let name = if language == active {
            Cell::new(format!("{} *", language)).fg(Color::Green)
        } else {
            Cell::new(language)
        };
        table.add_row(vec![
            name,
            Cell::new(language.builtin_merges().iter().join(", ")),
            Cell::new(language.priority()),
        ]);
    }
    println!("\n{}", table);
}

/// Plaintext labels with their homophone capacity.
pub fn print_alphabet(problem: &Problem) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Label").add_attribute(Attribute::Bold),
        Cell::new("Capacity"),
        Cell::new("Forced"),
    ]);

    let mut forced: HashMap<usize, usize> = HashMap::new();
    for &p in problem.forced.iter().filter(|&&p| p >= 0) {
        *forced.entry(p as usize).or_default() += 1;
    }

    for (p, label) in problem.p_list.labels().iter().enumerate() {
        table.add_row(vec![
            Cell::new(p),
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new(problem.capacities[p]),
            Cell::new(forced.get(&p).copied().unwrap_or(0)),
        ]);
    }
    align_right(&mut table, 2..4);
    println!("\n{}", table);
    println!(
        "{} plaintext labels, {} symbol types, capacity {}",
        problem.p_list.len(),
        problem.c_list.len(),
        problem.assignable_capacity()
    );
}

/// Ciphertext symbols by number of occurrences.
pub fn print_symbol_counts(problem: &Problem, top: usize) {
    let mut counts = vec![0usize; problem.c_list.len()];
    for t in problem.cipher.iter().filter(|t| t.is_resolved()) {
        counts[t.index as usize] += 1;
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Symbol").add_attribute(Attribute::Bold),
        Cell::new("Count"),
    ]);
    for (c, n) in counts
        .iter()
        .enumerate()
        .sorted_by(|a, b| b.1.cmp(a.1))
        .take(top)
    {
        table.add_row(vec![Cell::new(problem.c_list.label(c)), Cell::new(n)]);
    }
    align_right(&mut table, 1..2);
    println!("\n{}", table);
}

pub fn print_top_ngrams(problem: &Problem, top: usize) {
    let table_data = &problem.table;
    let mut table = new_table();
    table.set_header(vec![
        Cell::new(format!("{}-gram", table_data.order())).add_attribute(Attribute::Bold),
        Cell::new("Weight").fg(Color::Green),
    ]);

    for (coords, weight) in table_data.top(top) {
        let text: String = coords
            .iter()
            .map(|&p| problem.p_list.label(p))
            .collect();
        table.add_row(vec![Cell::new(text), Cell::new(weight)]);
    }
    align_right(&mut table, 1..2);
    println!("\n{}", table);
    println!(
        "{} non-zero cells of {} (order {}, {} labels)",
        table_data.non_zero(),
        table_data.len(),
        table_data.order(),
        table_data.dim()
    );
}
