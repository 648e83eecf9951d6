// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type shared by the arithmetic, the parsers and the
//! engine.  Arithmetic and parsing errors are raised where they occur;
//! whoever calls decides whether that aborts a whole request or just
//! one band of it.

use failure::Fail;
use std::fmt;

/// Everything that can go wrong while building or computing a fractal.
#[derive(Debug, Clone, PartialEq)]
pub enum FractalError {
    /// A numeric or structural argument was outside its domain: a
    /// negative exponent, a zero track count, an inverted viewport.
    InvalidArgument(String),

    /// Complex division by a value whose module is exactly zero.  In
    /// practice, a vanishing derivative during the Newton iteration.
    DivisionByZero,

    /// Text that could not be read as a complex number.
    ParseError {
        /// 1-based input line, when the text came from a line reader.
        line: Option<usize>,
        /// The offending text.
        text: String,
    },

    /// The task queue between the orchestrator and the workers broke.
    Queue(String),

    /// Reading roots or writing the image failed.
    Io(String),
}

impl fmt::Display for FractalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FractalError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            FractalError::DivisionByZero => write!(f, "division by zero"),
            FractalError::ParseError { line: Some(line), text } => write!(
                f,
                "cannot parse '{}' as a complex number (line {})",
                text, line
            ),
            FractalError::ParseError { line: None, text } => {
                write!(f, "cannot parse '{}' as a complex number", text)
            }
            FractalError::Queue(msg) => write!(f, "task queue failure: {}", msg),
            FractalError::Io(msg) => write!(f, "i/o failure: {}", msg),
        }
    }
}

impl Fail for FractalError {}

impl FractalError {
    /// A parse error with no line information.
    pub fn parse<S: Into<String>>(text: S) -> Self {
        FractalError::ParseError {
            line: None,
            text: text.into(),
        }
    }

    /// Attach a line number to a parse error.  Other variants are
    /// returned as they are.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            FractalError::ParseError { text, .. } => FractalError::ParseError {
                line: Some(line),
                text,
            },
            other => other,
        }
    }

    /// Shorthand for `InvalidArgument`.
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        FractalError::InvalidArgument(message.into())
    }
}

impl From<std::io::Error> for FractalError {
    fn from(e: std::io::Error) -> Self {
        FractalError::Io(e.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FractalError>;
