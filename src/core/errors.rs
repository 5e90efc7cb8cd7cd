// src/core/errors.rs

//! Defines the primary error type for the entire application.

use std::path::PathBuf;
use thiserror::Error;

/// The main error enum, representing all possible failures within the server.
/// Using `thiserror` allows for clean error definitions and automatic `From` trait implementations.
#[derive(Error, Debug)]
pub enum FencelineError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed in the middle of a frame")]
    TruncatedFrame,

    #[error("Frame payload is not valid UTF-8")]
    InvalidFrameEncoding,

    #[error("Frame payload of {0} bytes exceeds the {max}-byte limit", max = u16::MAX)]
    FrameTooLarge(usize),

    #[error("Unknown command verb '{0}'")]
    UnknownVerb(String),

    #[error("Arguments for '{0}' do not match the command grammar")]
    GrammarMismatch(String),

    #[error("Invalid device name '{0}'")]
    InvalidDeviceName(String),

    #[error("Record file '{path}' is corrupt")]
    RecordCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl FencelineError {
    /// True for the rejection classes that drop a command line without a
    /// reply: unrecognized verbs and argument pattern failures.
    pub fn is_grammar_mismatch(&self) -> bool {
        matches!(
            self,
            FencelineError::UnknownVerb(_) | FencelineError::GrammarMismatch(_)
        )
    }
}
