//! Flattening of hierarchical names into one destination segment
//!
//! `cache/appdata` encodes to `cache_appdata` with the default substitute.
//! A literal substitute or escape character inside a segment is prefixed
//! with [`ESCAPE`], so `cache/app_data` encodes to `cache_app:_data` and
//! decoding is the exact inverse for every valid name.

use thiserror::Error;

use super::name::{DatasetName, InvalidDatasetName, SEGMENT_PUNCTUATION, SEPARATOR};

/// Default separator substitute
pub const DEFAULT_SUBSTITUTE: char = '_';

/// Marks the next character as literal
pub const ESCAPE: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("separator substitute '{0}' is not a legal dataset segment character")]
    IllegalSubstitute(char),

    #[error("separator substitute must differ from the escape character '{}'", ESCAPE)]
    SubstituteIsEscape,

    #[error("'{flat}' is not an encoded dataset name: {reason}")]
    Malformed { flat: String, reason: &'static str },

    #[error(transparent)]
    InvalidName(#[from] InvalidDatasetName),
}

/// Bijective mapping between `DatasetName` and a flat single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCodec {
    substitute: char,
}

impl PathCodec {
    /// The substitute must be legal inside a segment so the encoded form is
    /// a valid destination name.
    pub fn new(substitute: char) -> Result<Self, CodecError> {
        if substitute == SEPARATOR || !SEGMENT_PUNCTUATION.contains(substitute) {
            return Err(CodecError::IllegalSubstitute(substitute));
        }
        if substitute == ESCAPE {
            return Err(CodecError::SubstituteIsEscape);
        }
        Ok(Self { substitute })
    }

    pub fn substitute(&self) -> char {
        self.substitute
    }

    pub fn encode(&self, name: &DatasetName) -> String {
        let mut flat = String::with_capacity(name.as_str().len());
        for c in name.as_str().chars() {
            if c == SEPARATOR {
                flat.push(self.substitute);
            } else if c == self.substitute || c == ESCAPE {
                flat.push(ESCAPE);
                flat.push(c);
            } else {
                flat.push(c);
            }
        }
        flat
    }

    pub fn decode(&self, flat: &str) -> Result<DatasetName, CodecError> {
        let malformed = |reason| CodecError::Malformed {
            flat: flat.to_string(),
            reason,
        };

        let mut name = String::with_capacity(flat.len());
        let mut chars = flat.chars();
        while let Some(c) = chars.next() {
            if c == ESCAPE {
                match chars.next() {
                    Some(next) if next == self.substitute || next == ESCAPE => name.push(next),
                    Some(_) => return Err(malformed("escape must precede the substitute or itself")),
                    None => return Err(malformed("dangling escape")),
                }
            } else if c == self.substitute {
                name.push(SEPARATOR);
            } else if c == SEPARATOR {
                return Err(malformed("contains a separator"));
            } else {
                name.push(c);
            }
        }
        Ok(DatasetName::parse(&name)?)
    }
}

impl Default for PathCodec {
    fn default() -> Self {
        Self {
            substitute: DEFAULT_SUBSTITUTE,
        }
    }
}
