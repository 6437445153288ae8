//! # henkan
//!
//! In-memory conversion state for a kana-to-kanji conversion engine.
//!
//! This crate is the shared workspace between the composer, the converter,
//! the rewriters, the predictor, and the renderer: at any instant it holds
//! the user's utterance split into [`Segment`]s, each segment's ranked
//! [`Candidate`]s, and a bounded tail of history segments that feed
//! learning and bigram prediction. Every pipeline stage reads and mutates
//! the same [`Segments`] instance.
//!
//! ## Structure
//!
//! - [`Candidate`] — one possible surface rendering for a reading, with
//!   costs, linguistic-context ids, attribute bits, and an optional
//!   inner-segment breakdown packed as [`BoundaryCode`]s.
//! - [`Segment`] — one contiguous reading unit; owns a deque of pooled
//!   candidates (stable handles) plus a parallel array of meta candidates
//!   addressed by negative index.
//! - [`Segments`] — the ordered segment list, partitioned into a history
//!   prefix and a conversion suffix, plus the revert journal and one
//!   cached [`Lattice`].
//!
//! ## Example
//!
//! ```rust
//! use henkan::{Segments, SegmentType};
//!
//! let mut segments = Segments::new();
//!
//! // History left over from the previous commit.
//! let history = segments.add_segment();
//! history.set_segment_type(SegmentType::History);
//! history.set_key("きょうは");
//! history.push_back_candidate().value = "今日は".to_string();
//!
//! // The active utterance.
//! let active = segments.add_segment();
//! active.set_key("はれ");
//! active.push_back_candidate().value = "晴れ".to_string();
//! active.push_back_candidate().value = "貼れ".to_string();
//!
//! assert_eq!(segments.history_segments_size(), 1);
//! assert_eq!(segments.conversion_segments_size(), 1);
//! assert_eq!(segments.history_value(-1), "今日は");
//! assert_eq!(segments.conversion_segment(0).candidate(0).value, "晴れ");
//! ```
//!
//! ## Ownership and handle stability
//!
//! `Segments` owns its segments through a pool; each `Segment` owns its
//! candidates the same way. Handles returned by push/insert stay valid
//! across edits elsewhere in the same owner and die at the owner's next
//! `clear` (or when a deep copy replaces it). [`Clone`] produces a
//! structurally equal container with disjoint storage.
//!
//! The container is single-owner and not synchronized; the session layer
//! is responsible for exclusive access.

#![warn(missing_docs)]

pub mod boundary;
pub mod candidate;
pub mod error;
pub mod lattice;
mod pool;
pub mod segment;
pub mod segments;
pub mod style;

pub use boundary::{BoundaryCode, InnerSegment, InnerSegmentIter, MAX_PIECE_LEN};
pub use candidate::{Attributes, Candidate, Category, Command, SourceInfo};
pub use error::{Error, Result};
pub use lattice::Lattice;
pub use segment::{Segment, SegmentType};
pub use segments::{
    RevertEntry, RevertEntryType, SegmentRange, SegmentRangeIter, Segments,
};
pub use style::NumberStyle;
