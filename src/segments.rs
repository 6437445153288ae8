//! Segments: the partitioned container for one conversion session.
//!
//! The container holds an ordered list of segments split into two runs:
//!
//! ```text
//! segments: [ HS_0, HS_1, ... HS_n | CS_0, CS_1, CS_2 ... ]
//!             history prefix         conversion suffix
//! ```
//!
//! History segments (type [`History`](crate::SegmentType::History) or
//! [`Submitted`](crate::SegmentType::Submitted)) are what the user committed just
//! before the current transaction; they are hidden from the user and feed
//! learning and bigram prediction. Conversion segments are the active
//! utterance. The split point is never stored: it is recomputed as the
//! length of the maximal leading run of history-typed segments, so
//! changing a segment's type in place moves the partition by itself.
//!
//! Beside the segment list the container carries the revert journal
//! (opaque records learners use to undo their last update) and one cached
//! [`Lattice`] reused across conversions.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::ops::Index;

use crate::lattice::Lattice;
use crate::pool::Pool;
use crate::segment::Segment;

/// Slots pre-reserved in the segment pool.
const SEGMENTS_POOL_SIZE: usize = 32;

// ============================================================================
// Revert journal
// ============================================================================

/// Kind of learning update a revert entry undoes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[repr(u16)]
pub enum RevertEntryType {
    /// The learner created a new entry.
    #[default]
    CreateEntry = 0,
    /// The learner updated an existing entry.
    UpdateEntry = 1,
}

/// One record a learning component writes so it can undo its last update
/// when the user reverts.
///
/// The container stores these in insertion order and never interprets
/// them; `id` tags the owning component (the user-history predictor uses
/// 1) and keys must not collide across owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertEntry {
    /// Kind of update to undo.
    pub revert_entry_type: RevertEntryType,
    /// Owner tag.
    pub id: u16,
    /// Seconds timestamp of the update.
    pub timestamp: u32,
    /// Owner-defined payload.
    pub key: String,
}

// ============================================================================
// Range views
// ============================================================================

/// Half-open, random-access view over a run of segments.
///
/// Indexing is bounds-checked and panics on violation; `front`/`back`
/// require a non-empty range. The adaptors (`skip`, `take`, `take_last`,
/// `subrange`) clamp to the view instead of panicking.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRange<'a> {
    segments: &'a VecDeque<Box<Segment>>,
    start: usize,
    end: usize,
}

impl<'a> SegmentRange<'a> {
    fn new(segments: &'a VecDeque<Box<Segment>>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= segments.len());
        Self {
            segments,
            start,
            end,
        }
    }

    /// Number of segments in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the view covers no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The segment at `index` within the view, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Segment> {
        if index < self.len() {
            Some(&*self.segments[self.start + index])
        } else {
            None
        }
    }

    /// The first segment of the view.
    ///
    /// # Panics
    ///
    /// Panics when the view is empty.
    #[must_use]
    pub fn front(&self) -> &'a Segment {
        assert!(!self.is_empty(), "front() on an empty segment range");
        &self.segments[self.start]
    }

    /// The last segment of the view.
    ///
    /// # Panics
    ///
    /// Panics when the view is empty.
    #[must_use]
    pub fn back(&self) -> &'a Segment {
        assert!(!self.is_empty(), "back() on an empty segment range");
        &self.segments[self.end - 1]
    }

    /// Drops the first `count` segments, clamping past the end.
    #[must_use]
    pub fn skip(&self, count: usize) -> Self {
        Self {
            segments: self.segments,
            start: (self.start + count).min(self.end),
            end: self.end,
        }
    }

    /// Keeps only the first `count` segments, clamping past the end.
    #[must_use]
    pub fn take(&self, count: usize) -> Self {
        Self {
            segments: self.segments,
            start: self.start,
            end: (self.start + count).min(self.end),
        }
    }

    /// Keeps only the last `count` segments, clamping past the start.
    #[must_use]
    pub fn take_last(&self, count: usize) -> Self {
        self.skip(self.len().saturating_sub(count))
    }

    /// Same as `skip(index).take(count)`, spelled for readability.
    #[must_use]
    pub fn subrange(&self, index: usize, count: usize) -> Self {
        self.skip(index).take(count)
    }

    /// Iterates the segments of the view in order.
    #[must_use]
    pub fn iter(&self) -> SegmentRangeIter<'a> {
        (*self).into_iter()
    }
}

impl<'a> Index<usize> for SegmentRange<'a> {
    type Output = Segment;

    fn index(&self, index: usize) -> &Segment {
        assert!(
            index < self.len(),
            "segment range index {index} out of range (size {})",
            self.len()
        );
        &self.segments[self.start + index]
    }
}

impl<'a> IntoIterator for SegmentRange<'a> {
    type Item = &'a Segment;
    type IntoIter = SegmentRangeIter<'a>;

    fn into_iter(self) -> SegmentRangeIter<'a> {
        SegmentRangeIter {
            range: self,
            index: 0,
        }
    }
}

/// Iterator over a [`SegmentRange`].
#[derive(Debug, Clone)]
pub struct SegmentRangeIter<'a> {
    range: SegmentRange<'a>,
    index: usize,
}

impl<'a> Iterator for SegmentRangeIter<'a> {
    type Item = &'a Segment;

    fn next(&mut self) -> Option<&'a Segment> {
        let segment = self.range.get(self.index)?;
        self.index += 1;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.range.len() - self.index;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for SegmentRangeIter<'_> {}

// ============================================================================
// Segments
// ============================================================================

/// The conversion state for one session: history and conversion segments,
/// the revert journal, and the cached lattice.
///
/// Single-owner and not synchronized; the session layer serializes
/// access.
#[derive(Debug)]
pub struct Segments {
    max_history_segments_size: usize,
    resized: bool,
    pool: Pool<Segment>,
    segments: VecDeque<Box<Segment>>,
    revert_entries: Vec<RevertEntry>,
    cached_lattice: Lattice,
}

impl Default for Segments {
    fn default() -> Self {
        Self::new()
    }
}

impl Segments {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_history_segments_size: 0,
            resized: false,
            pool: Pool::with_reserve(SEGMENTS_POOL_SIZE),
            segments: VecDeque::new(),
            revert_entries: Vec::new(),
            cached_lattice: Lattice::new(),
        }
    }

    // -- sizes and partition -------------------------------------------------

    /// Total number of segments, history and conversion together.
    #[must_use]
    pub fn segments_size(&self) -> usize {
        self.segments.len()
    }

    /// Length of the leading run of history-typed segments. Recomputed on
    /// every call; changing a segment type in place moves the partition
    /// implicitly.
    #[must_use]
    pub fn history_segments_size(&self) -> usize {
        self.segments
            .iter()
            .take_while(|segment| segment.segment_type().is_history())
            .count()
    }

    /// Number of segments past the history prefix.
    #[must_use]
    pub fn conversion_segments_size(&self) -> usize {
        self.segments_size() - self.history_segments_size()
    }

    // -- getters -------------------------------------------------------------

    /// The segment at `i`, history and conversion segments alike.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[must_use]
    pub fn segment(&self, i: usize) -> &Segment {
        assert!(
            i < self.segments.len(),
            "segment index {i} out of range (size {})",
            self.segments.len()
        );
        &self.segments[i]
    }

    /// Mutable access to the segment at `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn segment_mut(&mut self, i: usize) -> &mut Segment {
        assert!(
            i < self.segments.len(),
            "segment index {i} out of range (size {})",
            self.segments.len()
        );
        &mut self.segments[i]
    }

    /// The `i`-th history segment. Equivalent to `segment(i)` while `i`
    /// stays inside the history prefix.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range of the whole list.
    #[must_use]
    pub fn history_segment(&self, i: usize) -> &Segment {
        self.segment(i)
    }

    /// Mutable access to the `i`-th history segment.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range of the whole list.
    pub fn history_segment_mut(&mut self, i: usize) -> &mut Segment {
        self.segment_mut(i)
    }

    /// The `i`-th conversion segment:
    /// `conversion_segment(i) == segment(i + history_segments_size())`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range of the conversion suffix.
    #[must_use]
    pub fn conversion_segment(&self, i: usize) -> &Segment {
        self.segment(i + self.history_segments_size())
    }

    /// Mutable access to the `i`-th conversion segment.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range of the conversion suffix.
    pub fn conversion_segment_mut(&mut self, i: usize) -> &mut Segment {
        let offset = self.history_segments_size();
        self.segment_mut(i + offset)
    }

    // -- ranges and iteration ------------------------------------------------

    /// View over every segment.
    #[must_use]
    pub fn all(&self) -> SegmentRange<'_> {
        SegmentRange::new(&self.segments, 0, self.segments.len())
    }

    /// View over the history prefix.
    #[must_use]
    pub fn history_segments(&self) -> SegmentRange<'_> {
        SegmentRange::new(&self.segments, 0, self.history_segments_size())
    }

    /// View over the conversion suffix.
    #[must_use]
    pub fn conversion_segments(&self) -> SegmentRange<'_> {
        SegmentRange::new(
            &self.segments,
            self.history_segments_size(),
            self.segments.len(),
        )
    }

    /// Iterates every segment in order.
    #[must_use]
    pub fn iter(&self) -> SegmentRangeIter<'_> {
        self.all().into_iter()
    }

    /// Iterates every segment mutably, in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Segment> {
        self.segments.iter_mut().map(|segment| &mut **segment)
    }

    // -- mutation ------------------------------------------------------------

    /// Prepends a cleared segment and returns it for filling in.
    pub fn push_front_segment(&mut self) -> &mut Segment {
        let segment = self.pool.alloc();
        self.segments.push_front(segment);
        &mut self.segments[0]
    }

    /// Appends a cleared segment and returns it for filling in.
    pub fn push_back_segment(&mut self) -> &mut Segment {
        let segment = self.pool.alloc();
        self.segments.push_back(segment);
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    /// Alias of [`push_back_segment`](Self::push_back_segment).
    pub fn add_segment(&mut self) -> &mut Segment {
        self.push_back_segment()
    }

    /// Inserts a cleared segment before position `i` and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `i > segments_size()`.
    pub fn insert_segment(&mut self, i: usize) -> &mut Segment {
        assert!(
            i <= self.segments.len(),
            "insert index {i} out of range (size {})",
            self.segments.len()
        );
        let segment = self.pool.alloc();
        self.segments.insert(i, segment);
        &mut self.segments[i]
    }

    /// Removes the first segment, returning its slot to the pool.
    /// No-op when empty.
    pub fn pop_front_segment(&mut self) {
        if let Some(segment) = self.segments.pop_front() {
            self.pool.release(segment);
        }
    }

    /// Removes the last segment, returning its slot to the pool.
    /// No-op when empty.
    pub fn pop_back_segment(&mut self) {
        if let Some(segment) = self.segments.pop_back() {
            self.pool.release(segment);
        }
    }

    /// Removes the segment at `i` and returns the index of the segment
    /// that followed it.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn erase_segment(&mut self, i: usize) -> usize {
        assert!(
            i < self.segments.len(),
            "erase index {i} out of range (size {})",
            self.segments.len()
        );
        if let Some(segment) = self.segments.remove(i) {
            self.pool.release(segment);
        }
        i
    }

    /// Removes `n` segments starting at `i` and returns the index of the
    /// segment that followed the removed run.
    ///
    /// # Panics
    ///
    /// Panics if the range `[i, i + n)` is not fully inside the list.
    pub fn erase_segments(&mut self, i: usize, n: usize) -> usize {
        assert!(
            i + n <= self.segments.len(),
            "erase range {i}..{} out of range (size {})",
            i + n,
            self.segments.len()
        );
        for _ in 0..n {
            if let Some(segment) = self.segments.remove(i) {
                self.pool.release(segment);
            }
        }
        i
    }

    /// Removes the history prefix. Conversion segments slide to the
    /// front.
    pub fn clear_history_segments(&mut self) {
        let history_size = self.history_segments_size();
        self.erase_segments(0, history_size);
    }

    /// Removes the conversion suffix, keeping history intact.
    pub fn clear_conversion_segments(&mut self) {
        let history_size = self.history_segments_size();
        let conversion_size = self.segments.len() - history_size;
        self.erase_segments(history_size, conversion_size);
    }

    /// Removes every segment, history and conversion alike.
    pub fn clear_segments(&mut self) {
        for segment in self.segments.drain(..) {
            self.pool.release(segment);
        }
    }

    /// Resets the container for a new session: segments, revert journal,
    /// the resized flag, and the pool all go back to their initial state.
    /// The cached lattice survives; it is a cross-session cache.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.revert_entries.clear();
        self.resized = false;
        self.pool = Pool::with_reserve(SEGMENTS_POOL_SIZE);
    }

    // -- history bound -------------------------------------------------------

    /// Records the cap on retained history segments. The container does
    /// not enforce it; after a learn step, callers trim the oldest
    /// history segments until `history_segments_size()` fits the cap.
    pub fn set_max_history_segments_size(&mut self, max_history_segments_size: usize) {
        self.max_history_segments_size = max_history_segments_size;
    }

    /// The recorded history cap.
    #[must_use]
    pub fn max_history_segments_size(&self) -> usize {
        self.max_history_segments_size
    }

    // -- resized flag --------------------------------------------------------

    /// True when the user manually altered segment boundaries; downstream
    /// logic avoids overriding the manual choice.
    #[must_use]
    pub fn resized(&self) -> bool {
        self.resized
    }

    /// Sets the manual-resize flag.
    pub fn set_resized(&mut self, resized: bool) {
        self.resized = resized;
    }

    // -- history text --------------------------------------------------------

    /// Concatenated keys of the last `size` history segments, oldest
    /// first. `size == -1` (or anything past the history length) means
    /// all of them.
    #[must_use]
    pub fn history_key(&self, size: isize) -> String {
        let history_size = self.history_segments_size();
        let count = clamp_history_count(size, history_size);
        let mut result = String::new();
        for segment in self
            .segments
            .iter()
            .take(history_size)
            .skip(history_size - count)
        {
            result.push_str(segment.key());
        }
        result
    }

    /// Concatenated top-candidate values of the last `size` history
    /// segments, oldest first. A history segment with no candidates
    /// contributes the empty string. `size == -1` means all.
    #[must_use]
    pub fn history_value(&self, size: isize) -> String {
        let history_size = self.history_segments_size();
        let count = clamp_history_count(size, history_size);
        let mut result = String::new();
        for segment in self
            .segments
            .iter()
            .take(history_size)
            .skip(history_size - count)
        {
            if segment.candidates_size() > 0 {
                result.push_str(&segment.candidate(0).value);
            }
        }
        result
    }

    // -- revert journal ------------------------------------------------------

    /// Appends a default-initialized revert entry and returns it for
    /// filling in.
    pub fn push_back_revert_entry(&mut self) -> &mut RevertEntry {
        self.revert_entries.push(RevertEntry::default());
        let last = self.revert_entries.len() - 1;
        &mut self.revert_entries[last]
    }

    /// Number of journal entries.
    #[must_use]
    pub fn revert_entries_size(&self) -> usize {
        self.revert_entries.len()
    }

    /// The journal entry at `i`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[must_use]
    pub fn revert_entry(&self, i: usize) -> &RevertEntry {
        &self.revert_entries[i]
    }

    /// Mutable access to the journal entry at `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn revert_entry_mut(&mut self, i: usize) -> &mut RevertEntry {
        &mut self.revert_entries[i]
    }

    /// Empties the journal. Segments are untouched.
    pub fn clear_revert_entries(&mut self) {
        self.revert_entries.clear();
    }

    // -- cached lattice ------------------------------------------------------

    /// The lattice instance retained across conversions. The converter
    /// owns its interpretation; the container only keeps it alive.
    pub fn cached_lattice_mut(&mut self) -> &mut Lattice {
        &mut self.cached_lattice
    }
}

impl<'a> IntoIterator for &'a Segments {
    type Item = &'a Segment;
    type IntoIter = SegmentRangeIter<'a>;

    fn into_iter(self) -> SegmentRangeIter<'a> {
        self.iter()
    }
}

impl Clone for Segments {
    /// Deep copy: segments are rebuilt through a fresh pool, the journal
    /// and lattice are value-copied. No handle into the source is valid
    /// in the clone.
    fn clone(&self) -> Self {
        let mut pool = Pool::with_reserve(SEGMENTS_POOL_SIZE);
        let segments = self
            .segments
            .iter()
            .map(|segment| {
                let mut slot = pool.alloc();
                *slot = (**segment).clone();
                slot
            })
            .collect();
        Self {
            max_history_segments_size: self.max_history_segments_size,
            resized: self.resized,
            pool,
            segments,
            revert_entries: self.revert_entries.clone(),
            cached_lattice: self.cached_lattice.clone(),
        }
    }
}

impl PartialEq for Segments {
    /// Structural equality over segments, the journal, the history cap,
    /// and the resized flag. Pool state is bookkeeping, not content.
    fn eq(&self, other: &Self) -> bool {
        self.max_history_segments_size == other.max_history_segments_size
            && self.resized == other.resized
            && self.segments == other.segments
            && self.revert_entries == other.revert_entries
            && self.cached_lattice == other.cached_lattice
    }
}

impl fmt::Display for Segments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let history_size = self.history_segments_size();
        for (i, segment) in self.segments.iter().enumerate() {
            let side = if i < history_size { "history" } else { "conversion" };
            write!(f, "segment[{i}] ({side}) {segment}")?;
        }
        Ok(())
    }
}

fn clamp_history_count(size: isize, history_size: usize) -> usize {
    if size < 0 {
        history_size
    } else {
        (size as usize).min(history_size)
    }
}
