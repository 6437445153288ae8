//! Error types for the conversion state container.

use thiserror::Error;

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for container operations.
///
/// Almost every operation in this crate is total; the one recoverable
/// failure is a boundary-length overflow while packing inner-segment
/// lengths. Out-of-range indexing and empty-range access are caller bugs
/// and panic instead of returning a variant here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// One of the four inner-segment piece lengths does not fit in a byte.
    #[error(
        "inner segment length exceeds 255: key={key_len}, value={value_len}, \
         content_key={content_key_len}, content_value={content_value_len}"
    )]
    LengthOverflow {
        /// Byte length of the piece's reading.
        key_len: usize,
        /// Byte length of the piece's surface form.
        value_len: usize,
        /// Byte length of the piece's content reading.
        content_key_len: usize,
        /// Byte length of the piece's content surface.
        content_value_len: usize,
    },
}
