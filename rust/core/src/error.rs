// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for parsing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the STEP tokenizer, decoder and engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Entity #{0} not found")]
    EntityNotFound(u32),

    #[error("Model {0} is not open")]
    ModelNotOpen(u32),

    #[error("Unexpected attribute on #{id}: {message}")]
    UnexpectedAttribute { id: u32, message: String },

    #[error("File contains no STEP DATA section")]
    MissingDataSection,
}

impl Error {
    /// Build a parse error at a byte position
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }

    /// Build an attribute error for an entity
    pub fn attribute(id: u32, message: impl Into<String>) -> Self {
        Error::UnexpectedAttribute {
            id,
            message: message.into(),
        }
    }
}
