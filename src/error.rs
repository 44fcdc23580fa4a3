//! Error types for DT values, tables and codecs.
//!
//! Every failure the crate can detect is surfaced as an [`Error`] value.
//! Nothing is recovered silently and no public operation aborts the process.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: malformed DT text, with 1-based line/column information
//! - **Binary Errors**: bad magic, unknown tags, truncated or trailing input
//! - **Allocation Errors**: a growable buffer could not reserve memory
//! - **I/O Errors**: file reading/writing failures
//!
//! ## Examples
//!
//! ```rust
//! use serde_dt::{load_text, Error};
//!
//! let result = load_text(b"{ a: [1 2 }");
//! assert!(result.is_err());
//!
//! if let Err(Error::Syntax { line, col, .. }) = result {
//!     assert_eq!((line, col), (1, 11));
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by value trees and the DT codecs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A growable buffer could not reserve the requested capacity.
    #[error("allocation failure: could not reserve {requested} elements")]
    AllocationFailure { requested: usize },

    /// Malformed DT text.
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// A binary tag outside the known variant set.
    #[error("unknown tag: {0}")]
    UnknownTag(u8),

    /// A known tag in a position that requires another one.
    #[error("unexpected tag: expected {expected}, found {found}")]
    UnexpectedTag {
        expected: &'static str,
        found: &'static str,
    },

    /// A field or declared length runs past the end of the input.
    #[error("truncated binary input: needed {needed} bytes, {remaining} remaining")]
    TruncatedBinary { needed: usize, remaining: usize },

    /// The input does not start with the DT binary magic.
    #[error("invalid header: expected \"dt\" magic")]
    InvalidHeader,

    /// The binary header carries a version this crate cannot read.
    #[error("unsupported binary version: {0}")]
    UnsupportedVersion(u8),

    /// Bytes remain after the root value was decoded.
    #[error("{0} trailing bytes after binary value")]
    TrailingBytes(usize),

    /// A decoded string is not valid UTF-8.
    #[error("invalid UTF-8 in string value")]
    InvalidUtf8,

    /// An index argument is past the end of a buffer.
    #[error("index {index} out of bounds (length={len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dt::Error;
    ///
    /// let err = Error::syntax(10, 5, "expected ':'");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    pub(crate) fn truncated(needed: usize, remaining: usize) -> Self {
        Error::TruncatedBinary { needed, remaining }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the `(line, column)` of a syntax error.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::Syntax { line, col, .. } => Some((*line, *col)),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
