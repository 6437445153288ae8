//! Segment: one contiguous reading unit and its ranked candidates.
//!
//! Candidates live in pool-backed boxed slots behind a deque, so a caller
//! may keep a reference to candidate `i` and continue using it after
//! pushes, pops, and inserts elsewhere in the same segment; only clearing
//! or destroying the segment invalidates it. Rewriters depend on this when
//! they hold a handle while reordering the list around it.
//!
//! A fixed-capacity vector of meta candidates (full-width/half-width
//! variants and the like) sits beside the regular list and is addressed
//! through negative indices: `candidate(-1)` is meta candidate 0,
//! `candidate(-2)` is meta candidate 1, and so on.

use std::collections::VecDeque;
use std::fmt;

use crate::candidate::Candidate;
use crate::pool::{Pool, Reusable};

/// Slots pre-reserved in each segment's candidate pool.
const CANDIDATES_POOL_SIZE: usize = 16;

/// How a segment participates in conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default)]
pub enum SegmentType {
    /// Fully automatic conversion.
    #[default]
    Free,
    /// Must not be merged with neighboring segments.
    FixedBoundary,
    /// Boundary and result are both fixed.
    FixedValue,
    /// Submitted segment.
    Submitted,
    /// History segment, hidden from the user.
    History,
}

impl SegmentType {
    /// True for the types that form the history prefix of the container.
    #[must_use]
    pub const fn is_history(self) -> bool {
        matches!(self, SegmentType::History | SegmentType::Submitted)
    }

    /// Short label used in debug dumps.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Free => "FREE",
            SegmentType::FixedBoundary => "FIXED_BOUNDARY",
            SegmentType::FixedValue => "FIXED_VALUE",
            SegmentType::Submitted => "SUBMITTED",
            SegmentType::History => "HISTORY",
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Reusable for Candidate {
    fn reset(&mut self) {
        self.clear();
    }
}

/// One reading unit within the current utterance, owning its candidates.
///
/// Note that `key` is shorter than the composed preedit when partial
/// suggestion is in effect: with the preedit "しれ|ません" there is a
/// single segment whose key is "しれ". A segment alone cannot tell that
/// case apart; callers combine the composer state with the container.
#[derive(Debug)]
pub struct Segment {
    segment_type: SegmentType,
    key: String,
    candidates: VecDeque<Box<Candidate>>,
    meta_candidates: Vec<Candidate>,
    pool: Pool<Candidate>,
    /// Candidates removed during the conversion process, kept for
    /// post-mortem inspection. Debug builds only.
    #[cfg(debug_assertions)]
    pub removed_candidates: Vec<Candidate>,
}

impl Default for Segment {
    fn default() -> Self {
        Self::new()
    }
}

impl Segment {
    /// Creates an empty free segment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segment_type: SegmentType::Free,
            key: String::new(),
            candidates: VecDeque::new(),
            meta_candidates: Vec::new(),
            pool: Pool::with_reserve(CANDIDATES_POOL_SIZE),
            #[cfg(debug_assertions)]
            removed_candidates: Vec::new(),
        }
    }

    /// This segment's conversion type.
    #[must_use]
    pub fn segment_type(&self) -> SegmentType {
        self.segment_type
    }

    /// Sets the conversion type.
    pub fn set_segment_type(&mut self, segment_type: SegmentType) {
        self.segment_type = segment_type;
    }

    /// The reading this segment covers.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Sets the reading.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Number of regular (non-meta) candidates.
    #[must_use]
    pub fn candidates_size(&self) -> usize {
        self.candidates.len()
    }

    /// Iterates regular candidates in rank order.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().map(|candidate| &**candidate)
    }

    /// True if `i` addresses an existing regular or meta candidate.
    #[must_use]
    pub fn is_valid_index(&self, i: isize) -> bool {
        if i < 0 {
            meta_index(i) < self.meta_candidates.len()
        } else {
            (i as usize) < self.candidates.len()
        }
    }

    /// The candidate at signed index `i`: non-negative indices address the
    /// regular list, negative indices address meta candidate `-i - 1`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range on either side.
    #[must_use]
    pub fn candidate(&self, i: isize) -> &Candidate {
        if i < 0 {
            self.meta_candidate(meta_index(i))
        } else {
            let index = i as usize;
            assert!(
                index < self.candidates.len(),
                "candidate index {index} out of range (size {})",
                self.candidates.len()
            );
            &self.candidates[index]
        }
    }

    /// Mutable access at signed index `i`; same addressing as
    /// [`candidate`](Self::candidate).
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range on either side.
    pub fn candidate_mut(&mut self, i: isize) -> &mut Candidate {
        if i < 0 {
            self.meta_candidate_mut(meta_index(i))
        } else {
            let index = i as usize;
            assert!(
                index < self.candidates.len(),
                "candidate index {index} out of range (size {})",
                self.candidates.len()
            );
            &mut self.candidates[index]
        }
    }

    /// Prepends a cleared candidate and returns it for filling in.
    pub fn push_front_candidate(&mut self) -> &mut Candidate {
        let candidate = self.pool.alloc();
        self.candidates.push_front(candidate);
        &mut self.candidates[0]
    }

    /// Appends a cleared candidate and returns it for filling in.
    pub fn push_back_candidate(&mut self) -> &mut Candidate {
        let candidate = self.pool.alloc();
        self.candidates.push_back(candidate);
        let last = self.candidates.len() - 1;
        &mut self.candidates[last]
    }

    /// Alias of [`push_back_candidate`](Self::push_back_candidate).
    pub fn add_candidate(&mut self) -> &mut Candidate {
        self.push_back_candidate()
    }

    /// Inserts a cleared candidate before position `i` and returns it.
    /// `i == candidates_size()` appends.
    ///
    /// # Panics
    ///
    /// Panics if `i` is negative or past the end of the list.
    pub fn insert_candidate(&mut self, i: isize) -> &mut Candidate {
        let position = self.insert_position(i);
        let candidate = self.pool.alloc();
        self.candidates.insert(position, candidate);
        &mut self.candidates[position]
    }

    /// Inserts an externally constructed candidate before position `i`,
    /// taking ownership. `i == candidates_size()` appends.
    ///
    /// # Panics
    ///
    /// Panics if `i` is negative or past the end of the list.
    pub fn insert_candidate_box(&mut self, i: isize, candidate: Box<Candidate>) {
        let position = self.insert_position(i);
        self.candidates.insert(position, candidate);
    }

    /// Inserts externally constructed candidates before position `i`,
    /// preserving their order. `i == candidates_size()` appends.
    ///
    /// # Panics
    ///
    /// Panics if `i` is negative or past the end of the list.
    pub fn insert_candidates(&mut self, i: isize, candidates: Vec<Box<Candidate>>) {
        let mut position = self.insert_position(i);
        for candidate in candidates {
            self.candidates.insert(position, candidate);
            position += 1;
        }
    }

    /// Removes the first candidate, returning its slot to the pool.
    /// No-op on an empty list.
    pub fn pop_front_candidate(&mut self) {
        if let Some(candidate) = self.candidates.pop_front() {
            self.pool.release(candidate);
        }
    }

    /// Removes the last candidate, returning its slot to the pool.
    /// No-op on an empty list.
    pub fn pop_back_candidate(&mut self) {
        if let Some(candidate) = self.candidates.pop_back() {
            self.pool.release(candidate);
        }
    }

    /// Removes the candidate at `i`, returning its slot to the pool.
    /// References to other candidates stay valid.
    ///
    /// # Panics
    ///
    /// Panics if `i` is negative (meta candidates cannot be erased) or
    /// out of range.
    pub fn erase_candidate(&mut self, i: isize) {
        assert!(i >= 0, "meta candidates cannot be erased (index {i})");
        let index = i as usize;
        assert!(
            index < self.candidates.len(),
            "erase index {index} out of range (size {})",
            self.candidates.len()
        );
        if let Some(candidate) = self.candidates.remove(index) {
            self.record_removed(&candidate);
            self.pool.release(candidate);
        }
    }

    /// Removes `n` candidates starting at `i`.
    ///
    /// # Panics
    ///
    /// Panics if the range `[i, i + n)` is not fully inside the list.
    pub fn erase_candidates(&mut self, i: isize, n: usize) {
        assert!(i >= 0, "meta candidates cannot be erased (index {i})");
        let index = i as usize;
        assert!(
            index + n <= self.candidates.len(),
            "erase range {index}..{} out of range (size {})",
            index + n,
            self.candidates.len()
        );
        for _ in 0..n {
            if let Some(candidate) = self.candidates.remove(index) {
                self.record_removed(&candidate);
                self.pool.release(candidate);
            }
        }
    }

    /// Removes all regular candidates. Meta candidates are retained.
    pub fn clear_candidates(&mut self) {
        for candidate in self.candidates.drain(..) {
            self.pool.release(candidate);
        }
    }

    /// Number of meta candidates.
    #[must_use]
    pub fn meta_candidates_size(&self) -> usize {
        self.meta_candidates.len()
    }

    /// The meta candidates, in slot order.
    #[must_use]
    pub fn meta_candidates(&self) -> &[Candidate] {
        &self.meta_candidates
    }

    /// Mutable access to the whole meta candidate vector, for rewriters
    /// that rebuild the variant slots wholesale.
    pub fn meta_candidates_mut(&mut self) -> &mut Vec<Candidate> {
        &mut self.meta_candidates
    }

    /// The meta candidate in slot `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[must_use]
    pub fn meta_candidate(&self, i: usize) -> &Candidate {
        assert!(
            i < self.meta_candidates.len(),
            "meta candidate index {i} out of range (size {})",
            self.meta_candidates.len()
        );
        &self.meta_candidates[i]
    }

    /// Mutable access to the meta candidate in slot `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn meta_candidate_mut(&mut self, i: usize) -> &mut Candidate {
        assert!(
            i < self.meta_candidates.len(),
            "meta candidate index {i} out of range (size {})",
            self.meta_candidates.len()
        );
        &mut self.meta_candidates[i]
    }

    /// Appends an empty meta candidate slot and returns it.
    pub fn add_meta_candidate(&mut self) -> &mut Candidate {
        self.meta_candidates.push(Candidate::default());
        let last = self.meta_candidates.len() - 1;
        &mut self.meta_candidates[last]
    }

    /// Removes all meta candidates.
    pub fn clear_meta_candidates(&mut self) {
        self.meta_candidates.clear();
    }

    /// Moves the candidate at `old_index` so it ends up at `new_index`,
    /// shifting the candidates in between. References to the moved
    /// candidate (and to every other candidate) stay valid; only indices
    /// change. Moving a candidate onto its own index is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if either index is negative (meta candidates cannot be
    /// moved) or out of range.
    pub fn move_candidate(&mut self, old_index: isize, new_index: isize) {
        assert!(
            old_index >= 0 && new_index >= 0,
            "meta candidates cannot be moved ({old_index} -> {new_index})"
        );
        let (old_index, new_index) = (old_index as usize, new_index as usize);
        let size = self.candidates.len();
        assert!(
            old_index < size && new_index < size,
            "move {old_index} -> {new_index} out of range (size {size})"
        );
        if old_index == new_index {
            return;
        }
        if let Some(candidate) = self.candidates.remove(old_index) {
            self.candidates.insert(new_index, candidate);
        }
    }

    /// Empties the segment: candidates, meta candidates, and the removed
    /// trail go away; the type resets to [`SegmentType::Free`] and the key
    /// to empty. The pool is retained so refilling is cheap.
    pub fn clear(&mut self) {
        self.clear_candidates();
        self.meta_candidates.clear();
        #[cfg(debug_assertions)]
        self.removed_candidates.clear();
        self.segment_type = SegmentType::Free;
        self.key.clear();
    }

    fn insert_position(&self, i: isize) -> usize {
        assert!(i >= 0, "insert position {i} must not be negative");
        let index = i as usize;
        assert!(
            index <= self.candidates.len(),
            "insert position {index} out of range (size {})",
            self.candidates.len()
        );
        index
    }

    #[cfg(debug_assertions)]
    fn record_removed(&mut self, candidate: &Candidate) {
        self.removed_candidates.push(candidate.clone());
    }

    #[cfg(not(debug_assertions))]
    fn record_removed(&mut self, _candidate: &Candidate) {}
}

impl Reusable for Segment {
    fn reset(&mut self) {
        self.clear();
    }
}

impl Clone for Segment {
    /// Deep copy: candidates are rebuilt in the clone's own pool, so no
    /// handle into the source aliases into the clone.
    fn clone(&self) -> Self {
        let mut pool = Pool::with_reserve(CANDIDATES_POOL_SIZE);
        let candidates = self
            .candidates
            .iter()
            .map(|candidate| {
                let mut slot = pool.alloc();
                *slot = (**candidate).clone();
                slot
            })
            .collect();
        Self {
            segment_type: self.segment_type,
            key: self.key.clone(),
            candidates,
            meta_candidates: self.meta_candidates.clone(),
            pool,
            #[cfg(debug_assertions)]
            removed_candidates: self.removed_candidates.clone(),
        }
    }
}

impl PartialEq for Segment {
    /// Structural equality over type, key, candidates, and meta
    /// candidates. Pool state and the removed-candidate trail are
    /// bookkeeping, not content.
    fn eq(&self, other: &Self) -> bool {
        self.segment_type == other.segment_type
            && self.key == other.key
            && self.candidates == other.candidates
            && self.meta_candidates == other.meta_candidates
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "key: {:?} type: {}", self.key, self.segment_type)?;
        for (i, candidate) in self.candidates.iter().enumerate() {
            writeln!(f, "  [{i}] {candidate}")?;
        }
        for (i, candidate) in self.meta_candidates.iter().enumerate() {
            writeln!(f, "  [{}] {candidate}", -(i as isize) - 1)?;
        }
        Ok(())
    }
}

const fn meta_index(i: isize) -> usize {
    (-(i + 1)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(segment: &mut Segment, values: &[&str]) {
        for value in values {
            segment.push_back_candidate().value = (*value).to_string();
        }
    }

    #[test]
    fn test_push_and_signed_access() {
        let mut segment = Segment::new();
        filled(&mut segment, &["一", "二", "三"]);
        segment.add_meta_candidate().value = "１".to_string();
        segment.add_meta_candidate().value = "一二".to_string();

        assert_eq!(segment.candidates_size(), 3);
        assert_eq!(segment.meta_candidates_size(), 2);
        assert_eq!(segment.candidate(0).value, "一");
        assert_eq!(segment.candidate(2).value, "三");
        assert_eq!(segment.candidate(-1).value, "１");
        assert_eq!(segment.candidate(-2).value, "一二");
    }

    #[test]
    fn test_is_valid_index() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b", "c"]);
        segment.add_meta_candidate();
        segment.add_meta_candidate();

        assert!(segment.is_valid_index(0));
        assert!(segment.is_valid_index(2));
        assert!(!segment.is_valid_index(3));
        assert!(segment.is_valid_index(-1));
        assert!(segment.is_valid_index(-2));
        assert!(!segment.is_valid_index(-3));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_candidate_out_of_range_panics() {
        let segment = Segment::new();
        let _ = segment.candidate(0);
    }

    #[test]
    fn test_push_pop_roundtrip_reuses_slot() {
        let mut segment = Segment::new();
        let address = {
            let candidate = segment.push_back_candidate();
            candidate.value = "使い捨て".to_string();
            candidate as *const Candidate
        };
        segment.pop_back_candidate();
        assert_eq!(segment.candidates_size(), 0);

        // LIFO free list hands the same slot back, cleared.
        let recycled = segment.push_back_candidate();
        assert!(std::ptr::eq(address, recycled));
        assert!(recycled.value.is_empty());
    }

    #[test]
    fn test_handles_stable_across_deque_edits() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b", "c"]);
        let address = segment.candidate(1) as *const Candidate;

        segment.push_front_candidate().value = "front".to_string();
        segment.push_back_candidate().value = "back".to_string();
        segment.insert_candidate(3).value = "mid".to_string();

        // Same allocation, new position.
        assert!(std::ptr::eq(address, segment.candidate(2)));
        assert_eq!(segment.candidate(2).value, "b");
    }

    #[test]
    fn test_insert_on_empty_equals_push_back() {
        let mut a = Segment::new();
        let mut b = Segment::new();
        a.insert_candidate(0).value = "唯一".to_string();
        b.push_back_candidate().value = "唯一".to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insert_at_end_appends() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b"]);
        segment.insert_candidate(2).value = "tail".to_string();
        segment.insert_candidate(0).value = "head".to_string();
        let values: Vec<_> = segment.candidates().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["head", "a", "b", "tail"]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_insert_candidate_past_end_panics() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b"]);
        segment.insert_candidate(3);
    }

    #[test]
    #[should_panic(expected = "must not be negative")]
    fn test_insert_candidate_negative_panics() {
        let mut segment = Segment::new();
        segment.insert_candidate(-1);
    }

    #[test]
    fn test_insert_candidates_preserves_order() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "d"]);
        let batch = vec![
            Box::new(Candidate {
                value: "b".to_string(),
                ..Candidate::default()
            }),
            Box::new(Candidate {
                value: "c".to_string(),
                ..Candidate::default()
            }),
        ];
        segment.insert_candidates(1, batch);
        let values: Vec<_> = segment.candidates().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_erase_candidates_range() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b", "c", "d"]);
        segment.erase_candidates(1, 2);
        let values: Vec<_> = segment.candidates().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["a", "d"]);
    }

    #[test]
    #[should_panic(expected = "meta candidates cannot be erased")]
    fn test_erase_meta_candidate_panics() {
        let mut segment = Segment::new();
        segment.add_meta_candidate();
        segment.erase_candidate(-1);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_erase_records_removed_candidate() {
        let mut segment = Segment::new();
        filled(&mut segment, &["捨てる"]);
        segment.erase_candidate(0);
        assert_eq!(segment.removed_candidates.len(), 1);
        assert_eq!(segment.removed_candidates[0].value, "捨てる");
    }

    #[test]
    fn test_move_candidate_repositions() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b", "c", "d"]);
        segment.move_candidate(3, 0);
        let values: Vec<_> = segment.candidates().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["d", "a", "b", "c"]);

        segment.move_candidate(0, 2);
        let values: Vec<_> = segment.candidates().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["a", "b", "d", "c"]);
    }

    #[test]
    fn test_move_candidate_same_index_is_noop() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b"]);
        let address = segment.candidate(1) as *const Candidate;
        segment.move_candidate(1, 1);
        assert!(std::ptr::eq(address, segment.candidate(1)));
        assert_eq!(segment.candidates_size(), 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_move_candidate_out_of_range_panics() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b"]);
        segment.move_candidate(0, 2);
    }

    #[test]
    #[should_panic(expected = "meta candidates cannot be moved")]
    fn test_move_meta_candidate_panics() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a"]);
        segment.add_meta_candidate();
        segment.move_candidate(-1, 0);
    }

    #[test]
    fn test_move_candidate_keeps_handle_identity() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b", "c"]);
        let address = segment.candidate(2) as *const Candidate;
        segment.move_candidate(2, 0);
        assert!(std::ptr::eq(address, segment.candidate(0)));
        assert_eq!(segment.candidates_size(), 3);
    }

    #[test]
    fn test_clear_candidates_keeps_meta() {
        let mut segment = Segment::new();
        filled(&mut segment, &["a", "b"]);
        segment.add_meta_candidate().value = "Ａ".to_string();
        segment.clear_candidates();
        assert_eq!(segment.candidates_size(), 0);
        assert_eq!(segment.meta_candidates_size(), 1);
    }

    #[test]
    fn test_clear_resets_segment() {
        let mut segment = Segment::new();
        segment.set_key("きょう");
        segment.set_segment_type(SegmentType::History);
        filled(&mut segment, &["今日"]);
        segment.add_meta_candidate();

        segment.clear();
        assert_eq!(segment.candidates_size(), 0);
        assert_eq!(segment.meta_candidates_size(), 0);
        assert_eq!(segment.segment_type(), SegmentType::Free);
        assert_eq!(segment.key(), "");
    }

    #[test]
    fn test_clone_is_deep_and_disjoint() {
        let mut segment = Segment::new();
        segment.set_key("かみ");
        filled(&mut segment, &["神", "紙", "髪"]);
        segment.add_meta_candidate().value = "カミ".to_string();

        let copy = segment.clone();
        assert_eq!(segment, copy);
        assert!(!std::ptr::eq(segment.candidate(0), copy.candidate(0)));

        // Mutating the copy leaves the original untouched.
        let mut copy = copy;
        copy.candidate_mut(0).value = "加味".to_string();
        assert_eq!(segment.candidate(0).value, "神");
    }

    #[test]
    fn test_segment_type_history_classification() {
        assert!(SegmentType::History.is_history());
        assert!(SegmentType::Submitted.is_history());
        assert!(!SegmentType::Free.is_history());
        assert!(!SegmentType::FixedBoundary.is_history());
        assert!(!SegmentType::FixedValue.is_history());
    }
}
