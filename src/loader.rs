use crate::error::{CfResult, CipherForgeError};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Reads a raw plaintext reference corpus.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> CfResult<String> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    debug!("Loaded corpus {} ({} bytes)", path.display(), text.len());
    if text.trim().is_empty() {
        return Err(CipherForgeError::EmptyCorpus);
    }
    Ok(text)
}

/// Parses a transcription: one ciphertext line per record, one symbol label
/// per field. Empty fields (repeated delimiters) are dropped, quotes are
/// taken literally and lines with no symbol are skipped.
pub fn load_transcription<R: Read>(reader: R, delimiter: u8) -> CfResult<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut lines = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line: Vec<String> = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();
        if !line.is_empty() {
            lines.push(line);
        }
    }

    if lines.is_empty() {
        warn!("Transcription contains no symbols");
    }
    Ok(lines)
}

pub fn load_transcription_from_file<P: AsRef<Path>>(
    path: P,
    delimiter: u8,
) -> CfResult<Vec<Vec<String>>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let lines = load_transcription(file, delimiter)?;
    debug!(
        "Loaded transcription {} ({} lines, {} symbols)",
        path.display(),
        lines.len(),
        lines.iter().map(Vec::len).sum::<usize>()
    );
    Ok(lines)
}

/// Maps a delimiter name or single character to its byte.
pub fn parse_delimiter(name: &str) -> CfResult<u8> {
    match name {
        "space" | " " => Ok(b' '),
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        other if other.len() == 1 => Ok(other.as_bytes()[0]),
        other => Err(CipherForgeError::Config(format!(
            "unsupported delimiter '{}'",
            other
        ))),
    }
}
