pub mod score;
pub mod solve;
pub mod stats;

use cipherforge::key::KeyStore;

/// Everything read from disk before a command runs.
pub struct Inputs {
    pub corpus: String,
    pub lines: Vec<Vec<String>>,
    pub key: KeyStore,
}
