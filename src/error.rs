//! Error types for filelist-db
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Every parse-time error aborts the build of the whole protocol. Nothing is
//! published for a protocol whose build returned one of these.

use std::path::PathBuf;

use thiserror::Error;

use crate::protocol::{ProtocolId, ScoringMode};

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// filelist-db error types
#[derive(Error, Debug)]
pub enum Error {
    /// A mandatory list file does not exist
    #[error("Mandatory list file missing: {}", path.display())]
    MissingFile {
        /// Expected location of the list file
        path: PathBuf,
    },

    /// A non-blank row has the wrong number of columns
    #[error("Malformed row in {}:{line}: expected {expected} columns, found {found}", path.display())]
    MalformedRow {
        /// List file containing the row
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Column count required by the list role
        expected: usize,
        /// Column count actually read
        found: usize,
    },

    /// The same sample appears twice within one (protocol, group, purpose) partition
    #[error("Duplicate sample '{sample}' in {}:{line}", path.display())]
    DuplicateSample {
        /// List file containing the repeated row
        path: PathBuf,
        /// 1-based line number of the repetition
        line: usize,
        /// Sample path (and model id for score lists)
        sample: String,
    },

    /// Neither a probe list nor a score list exists
    #[error("No scoring list found for protocol {protocol}: expected {} or {}", probes.display(), scores.display())]
    NoScoringList {
        /// Protocol being resolved
        protocol: ProtocolId,
        /// Expected dense probe list
        probes: PathBuf,
        /// Expected sparse score list
        scores: PathBuf,
    },

    /// Both scoring lists exist and no override was configured
    #[error("Both {} and {} exist for protocol {protocol}\nSet `use_dense_probe_list` to choose one", probes.display(), scores.display())]
    AmbiguousScoringMode {
        /// Protocol being resolved
        protocol: ProtocolId,
        /// Dense probe list
        probes: PathBuf,
        /// Sparse score list
        scores: PathBuf,
    },

    /// A protocol disagrees with the scoring mode committed for the base directory
    #[error("Protocol {protocol} lacks the {committed} scoring list required by this base directory")]
    ProtocolModeMismatch {
        /// Offending protocol
        protocol: ProtocolId,
        /// Mode committed on first resolution
        committed: ScoringMode,
    },

    /// The protocol has no list files at all
    #[error("Unknown protocol {0}: no list files found")]
    UnknownProtocol(ProtocolId),

    /// A record references a model id absent from the model list
    #[error("Unknown model '{model_id}' in protocol {protocol}")]
    UnknownModel {
        /// Protocol being built or queried
        protocol: ProtocolId,
        /// Model id that could not be resolved
        model_id: String,
    },

    /// Enrollment rows for one model disagree on the owning client
    #[error("Model '{model_id}' is associated with two client ids '{first}' and '{second}'")]
    InconsistentModel {
        /// Model id with conflicting owners
        model_id: String,
        /// Client id seen first
        first: String,
        /// Conflicting client id
        second: String,
    },

    /// Base directory is not a directory
    #[error("Invalid base directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    /// Original data file does not exist under any configured extension
    #[error("Original file '{path}' does not exist with any of the extensions {extensions:?}")]
    OriginalFileNotFound {
        /// Sample path joined to the original directory
        path: String,
        /// Extensions that were tried
        extensions: Vec<String>,
    },

    /// Query parameters cannot be honoured
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be decoded
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error (record sink)
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
