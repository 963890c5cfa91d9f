use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Unsupported n-gram order {0} (expected 4, 5 or 6)")]
    UnsupportedOrder(usize),

    #[error("Reference corpus yields no plaintext tokens")]
    EmptyCorpus,

    #[error("Ciphertext has no assignable symbols")]
    EmptyCiphertext,

    #[error("Homophone capacity exceeded: {assignable} symbol types can be assigned, {required} must be")]
    CapacityExceeded { assignable: usize, required: usize },

    #[error("Key format error on line {line}: {message}")]
    KeyFormat { line: usize, message: String },
}

pub type CfResult<T> = Result<T, CipherForgeError>;
