//! Inner-segment boundary codec.
//!
//! A candidate produced by real-time conversion covers several underlying
//! word units at once. The converter records where those units meet by
//! packing four byte-lengths per unit into one 32-bit code:
//!
//! ```text
//!  bit 31        24 23        16 15         8 7          0
//! ┌───────────────┬────────────┬────────────┬────────────┐
//! │    key_len    │  value_len │ content_   │ content_   │
//! │               │            │  key_len   │  value_len │
//! └───────────────┴────────────┴────────────┴────────────┘
//! ```
//!
//! The byte layout is load-bearing: codes cross module boundaries as plain
//! `u32`s, so the field order must never change. Each length is a byte
//! count (UTF-8 bytes, not characters) and must fit in 8 bits; encoding
//! rejects anything longer with [`Error::LengthOverflow`].
//!
//! The code sequence on a candidate partitions its `key` and `value` left
//! to right. [`InnerSegmentIter`] walks that partition and hands out
//! borrowed views, one [`InnerSegment`] per code.

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::error::{Error, Result};

/// Largest piece length that fits in one encoded byte.
pub const MAX_PIECE_LEN: usize = u8::MAX as usize;

/// One packed inner-segment boundary entry.
///
/// This is a witness type: a `BoundaryCode` can only be produced by
/// [`BoundaryCode::encode`] (which enforces the 255-byte bound) or by
/// [`BoundaryCode::from_bits`] for codes that already crossed an ABI
/// boundary as raw integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct BoundaryCode(u32);

impl BoundaryCode {
    /// Packs the four piece lengths into one code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthOverflow`] if any length exceeds 255.
    pub fn encode(
        key_len: usize,
        value_len: usize,
        content_key_len: usize,
        content_value_len: usize,
    ) -> Result<Self> {
        if key_len > MAX_PIECE_LEN
            || value_len > MAX_PIECE_LEN
            || content_key_len > MAX_PIECE_LEN
            || content_value_len > MAX_PIECE_LEN
        {
            return Err(Error::LengthOverflow {
                key_len,
                value_len,
                content_key_len,
                content_value_len,
            });
        }
        Ok(Self(
            (key_len as u32) << 24
                | (value_len as u32) << 16
                | (content_key_len as u32) << 8
                | content_value_len as u32,
        ))
    }

    /// Reinterprets a raw 32-bit code.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw 32-bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Byte length of the piece's reading.
    #[must_use]
    pub const fn key_len(self) -> usize {
        (self.0 >> 24) as usize
    }

    /// Byte length of the piece's surface form.
    #[must_use]
    pub const fn value_len(self) -> usize {
        ((self.0 >> 16) & 0xFF) as usize
    }

    /// Byte length of the piece's content reading.
    #[must_use]
    pub const fn content_key_len(self) -> usize {
        ((self.0 >> 8) & 0xFF) as usize
    }

    /// Byte length of the piece's content surface.
    #[must_use]
    pub const fn content_value_len(self) -> usize {
        (self.0 & 0xFF) as usize
    }

    /// All four lengths in encoding order.
    #[must_use]
    pub const fn decode(self) -> (usize, usize, usize, usize) {
        (
            self.key_len(),
            self.value_len(),
            self.content_key_len(),
            self.content_value_len(),
        )
    }
}

impl std::fmt::Display for BoundaryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<{}, {}, {}, {}>",
            self.key_len(),
            self.value_len(),
            self.content_key_len(),
            self.content_value_len()
        )
    }
}

/// Borrowed view of one inner segment of a candidate.
///
/// `content_key`/`content_value` are prefixes of `key`/`value`; the
/// remainder past the content prefix is the functional part (okurigana,
/// particles).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerSegment<'a> {
    /// Reading covered by this piece.
    pub key: &'a str,
    /// Surface form of this piece.
    pub value: &'a str,
    /// Content prefix of `key`.
    pub content_key: &'a str,
    /// Content prefix of `value`.
    pub content_value: &'a str,
}

impl<'a> InnerSegment<'a> {
    /// The reading past the content prefix. Empty when the content prefix
    /// covers the whole piece.
    #[must_use]
    pub fn functional_key(&self) -> &'a str {
        &self.key[self.content_key.len()..]
    }

    /// The surface past the content prefix. Empty when the content prefix
    /// covers the whole piece.
    #[must_use]
    pub fn functional_value(&self) -> &'a str {
        &self.value[self.content_value.len()..]
    }
}

/// Iterator over a candidate's inner segments.
///
/// Lazy and forward-only; restart by constructing a new one via
/// [`Candidate::inner_segments`]. The iterator borrows the candidate, so
/// any mutation of `key`, `value`, or `inner_segment_boundary`
/// invalidates it (enforced by the borrow checker).
///
/// # Panics
///
/// Advancing past a code whose lengths overrun the candidate's `key` or
/// `value`, or split a UTF-8 sequence, panics. Feeding an inconsistent
/// boundary to the iterator is a caller bug; check
/// [`Candidate::is_valid`] first when the provenance is untrusted.
#[derive(Debug, Clone)]
pub struct InnerSegmentIter<'a> {
    candidate: &'a Candidate,
    key_offset: usize,
    value_offset: usize,
    index: usize,
}

impl<'a> InnerSegmentIter<'a> {
    /// Starts iteration at the first inner segment.
    #[must_use]
    pub fn new(candidate: &'a Candidate) -> Self {
        Self {
            candidate,
            key_offset: 0,
            value_offset: 0,
            index: 0,
        }
    }
}

impl<'a> Iterator for InnerSegmentIter<'a> {
    type Item = InnerSegment<'a>;

    fn next(&mut self) -> Option<InnerSegment<'a>> {
        let code = *self.candidate.inner_segment_boundary.get(self.index)?;
        let key_end = self.key_offset + code.key_len();
        let value_end = self.value_offset + code.value_len();
        let key = &self.candidate.key[self.key_offset..key_end];
        let value = &self.candidate.value[self.value_offset..value_end];
        let content_key = &key[..code.content_key_len().min(key.len())];
        let content_value = &value[..code.content_value_len().min(value.len())];
        self.key_offset = key_end;
        self.value_offset = value_end;
        self.index += 1;
        Some(InnerSegment {
            key,
            value,
            content_key,
            content_value,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.candidate.inner_segment_boundary.len() - self.index;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for InnerSegmentIter<'_> {}
