//! Crate-wide error type.

use std::io;

use thiserror::Error;

use crate::http::parser::ParseError;
use crate::http::writer::WriterError;

#[derive(Debug, Error)]
pub enum Error {
    /// The peer sent a request we refuse to handle.
    #[error("error parsing request: {0}")]
    Parse(#[from] ParseError),

    /// A response was written out of order.
    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
