use thiserror::Error;

/// Errors raised at the crate boundary.
///
/// Ranking itself never fails: a missing target, an empty corpus or a zero
/// count all produce an empty result. These variants cover malformed inputs
/// handed in from outside (external vector spaces, snapshots, configs).
#[derive(Debug, Error)]
pub enum Error {
    #[error("vocabulary is not sorted: {prev:?} appears before {next:?}")]
    UnsortedVocabulary { prev: String, next: String },

    #[error("duplicate vocabulary term: {0:?}")]
    DuplicateTerm(String),

    #[error("vocabulary term {0:?} has no idf weight")]
    MissingIdf(String),

    #[error("idf weight given for {0:?} which is not in the vocabulary")]
    UnknownIdfTerm(String),

    #[error("idf weight for {term:?} must be finite and positive, got {value}")]
    InvalidIdf { term: String, value: f64 },

    #[error("vector dimension mismatch for {id:?}: expected {expected}, got {actual}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate document id: {0:?}")]
    DuplicateDocumentId(String),

    #[error("snapshot encoding error: {0}")]
    Cbor(#[from] serde_cbor::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
