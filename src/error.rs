// src/error.rs

use thiserror::Error;
use wiegand_lib::WiegandError;

/// Errors from reading and replaying line traces.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trace line {line}: {message}")]
    Trace { line: usize, message: String },

    #[error("Engine error: {0}")]
    Engine(#[from] WiegandError),

    #[error("Invalid frame: {0}")]
    Frame(String),
}
