//! Candidate: one possible surface rendering of a reading.
//!
//! A candidate is a plain value object. The converter fills in the reading
//! and surface plus costs from the language model; rewriters then annotate,
//! rerank, and attach descriptions; the renderer reads everything. Fields
//! are public on purpose — every pipeline stage mutates candidates in
//! place, and the set of writers is open-ended.
//!
//! Attribute and source-info bits are part of the external ABI (they are
//! persisted in usage stats and crossed process boundaries historically),
//! so their positions must never be renumbered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use crate::boundary::{BoundaryCode, InnerSegmentIter};
use crate::error::Result;
use crate::style::NumberStyle;

// ============================================================================
// Attributes
// ============================================================================

/// Bitset of candidate attributes.
///
/// A transparent wrapper over the raw `u32` so the bit positions can cross
/// ABI boundaries unchanged while call sites still get typed set
/// operations.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Attributes(u32);

impl Attributes {
    /// Empty attribute set.
    pub const NONE: Self = Self(0);
    /// This was the best candidate before learning.
    pub const BEST_CANDIDATE: Self = Self(1 << 0);
    /// This candidate was reranked by the user.
    pub const RERANKED: Self = Self(1 << 1);
    /// Do not save it in conversion history.
    pub const NO_HISTORY_LEARNING: Self = Self(1 << 2);
    /// Do not save it in suggestion history.
    pub const NO_SUGGEST_LEARNING: Self = Self(1 << 3);
    /// Union of both learning suppression bits.
    pub const NO_LEARNING: Self = Self(1 << 2 | 1 << 3);
    /// Learn it with left/right context.
    pub const CONTEXT_SENSITIVE: Self = Self(1 << 4);
    /// Carries a "did you mean" correction.
    pub const SPELLING_CORRECTION: Self = Self(1 << 5);
    /// No need for full/half width expansion.
    pub const NO_VARIANTS_EXPANSION: Self = Self(1 << 6);
    /// No need for extra descriptions.
    pub const NO_EXTRA_DESCRIPTION: Self = Self(1 << 7);
    /// Generated by real-time conversion.
    pub const REALTIME_CONVERSION: Self = Self(1 << 8);
    /// Contains tokens from the user dictionary.
    pub const USER_DICTIONARY: Self = Self(1 << 9);
    /// Command candidate, e.g. toggling incognito mode.
    pub const COMMAND_CANDIDATE: Self = Self(1 << 10);
    /// Key characters are consumed only up to `consumed_key_size`.
    pub const PARTIALLY_KEY_CONSUMED: Self = Self(1 << 11);
    /// Typing correction candidate.
    pub const TYPING_CORRECTION: Self = Self(1 << 12);
    /// Automatic partial suggestion candidate.
    pub const AUTO_PARTIAL_SUGGESTION: Self = Self(1 << 13);
    /// Predicted from the user prediction history.
    pub const USER_HISTORY_PREDICTION: Self = Self(1 << 14);
    /// Came from the suffix dictionary.
    pub const SUFFIX_DICTIONARY: Self = Self(1 << 15);
    /// Rewriters must not modify or remove this candidate.
    pub const NO_MODIFICATION: Self = Self(1 << 16);

    const NAMES: [(Self, &'static str); 17] = [
        (Self::BEST_CANDIDATE, "BEST_CANDIDATE"),
        (Self::RERANKED, "RERANKED"),
        (Self::NO_HISTORY_LEARNING, "NO_HISTORY_LEARNING"),
        (Self::NO_SUGGEST_LEARNING, "NO_SUGGEST_LEARNING"),
        (Self::CONTEXT_SENSITIVE, "CONTEXT_SENSITIVE"),
        (Self::SPELLING_CORRECTION, "SPELLING_CORRECTION"),
        (Self::NO_VARIANTS_EXPANSION, "NO_VARIANTS_EXPANSION"),
        (Self::NO_EXTRA_DESCRIPTION, "NO_EXTRA_DESCRIPTION"),
        (Self::REALTIME_CONVERSION, "REALTIME_CONVERSION"),
        (Self::USER_DICTIONARY, "USER_DICTIONARY"),
        (Self::COMMAND_CANDIDATE, "COMMAND_CANDIDATE"),
        (Self::PARTIALLY_KEY_CONSUMED, "PARTIALLY_KEY_CONSUMED"),
        (Self::TYPING_CORRECTION, "TYPING_CORRECTION"),
        (Self::AUTO_PARTIAL_SUGGESTION, "AUTO_PARTIAL_SUGGESTION"),
        (Self::USER_HISTORY_PREDICTION, "USER_HISTORY_PREDICTION"),
        (Self::SUFFIX_DICTIONARY, "SUFFIX_DICTIONARY"),
        (Self::NO_MODIFICATION, "NO_MODIFICATION"),
    ];

    /// The raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Reinterprets raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// True if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set in `self`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Sets every bit of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears every bit of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for Attributes {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Attributes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Attributes {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Attributes {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (bit, name) in Self::NAMES {
            if self.intersects(bit) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        if first {
            write!(f, "NONE")?;
        }
        Ok(())
    }
}

// ============================================================================
// SourceInfo
// ============================================================================

/// Bitset describing where a candidate came from, for usage stats.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct SourceInfo(u32);

impl SourceInfo {
    /// No provenance recorded.
    pub const NONE: Self = Self(0);
    /// Zero-query suggestion with no particular type.
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_NONE: Self = Self(1 << 0);
    /// Zero-query number-suffix suggestion.
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_NUMBER_SUFFIX: Self = Self(1 << 1);
    /// Zero-query emoticon suggestion.
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_EMOTICON: Self = Self(1 << 2);
    /// Zero-query emoji suggestion.
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_EMOJI: Self = Self(1 << 3);
    /// Zero-query bigram suggestion.
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_BIGRAM: Self = Self(1 << 4);
    /// Zero-query suffix suggestion.
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_SUFFIX: Self = Self(1 << 5);
    /// Produced by the user history predictor.
    pub const USER_HISTORY_PREDICTOR: Self = Self(1 << 6);

    /// The raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Reinterprets raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// True if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets every bit of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears every bit of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for SourceInfo {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SourceInfo {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// Category / Command
// ============================================================================

/// Coarse routing category of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    /// Realtime conversion, history prediction, and other ordinary results.
    #[default]
    Default,
    /// Symbols and emoji.
    Symbol,
    /// Miscellaneous candidates.
    Other,
}

/// Side-effect command a candidate triggers on submission. Not a bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Command {
    /// No side effect.
    #[default]
    Default,
    /// Enables incognito mode.
    EnableIncognito,
    /// Disables incognito mode.
    DisableIncognito,
    /// Enables presentation mode.
    EnablePresentation,
    /// Disables presentation mode.
    DisablePresentation,
}

// ============================================================================
// Candidate
// ============================================================================

/// One possible surface rendering for a reading, with cost and linguistic
/// metadata.
///
/// Readings and surfaces are byte strings (`String`); every length in this
/// struct and in [`BoundaryCode`] is a UTF-8 byte count.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Reading covered by this candidate.
    pub key: String,
    /// Surface form shown to the user.
    pub value: String,
    /// Reading of the content (non-functional) prefix of `key`.
    pub content_key: String,
    /// Surface of the content prefix of `value`.
    pub content_value: String,

    /// Bytes of `key` actually consumed when
    /// [`Attributes::PARTIALLY_KEY_CONSUMED`] is set; otherwise the whole
    /// key is consumed.
    pub consumed_key_size: usize,

    /// Display prefix.
    pub prefix: String,
    /// Display suffix.
    pub suffix: String,
    /// Description, including its type and message.
    pub description: String,
    /// Description for accessibility support, e.g. "あ。ヒラガナ あ".
    pub a11y_description: String,

    /// Index into the external usage dictionary; 0 means none.
    pub usage_id: i32,
    /// Title of the usage entry, the basic form of this candidate.
    pub usage_title: String,
    /// Body of the usage entry.
    pub usage_description: String,

    /// Context-sensitive total cost. Candidates are ordered by this.
    pub cost: i32,
    /// Context-free word cost.
    pub wcost: i32,
    /// Cost of transitions only, without adjacent word costs.
    pub structure_cost: i32,

    /// Linguistic-context id at the left boundary.
    pub lid: u16,
    /// Linguistic-context id at the right boundary.
    pub rid: u16,

    /// Attribute bits.
    pub attributes: Attributes,
    /// Provenance bits for usage stats.
    pub source_info: SourceInfo,
    /// Coarse routing category.
    pub category: Category,
    /// Numeric formatting style; interpreted by the number rewriter.
    pub style: NumberStyle,
    /// Side-effect command to run on submission.
    pub command: Command,

    /// Piecewise boundary codes set by real-time conversion. Empty for
    /// candidates that cover a single word unit.
    pub inner_segment_boundary: Vec<BoundaryCode>,

    /// Original cost before rescoring, retained for debugging.
    pub cost_before_rescoring: i32,

    /// Accumulated debug trace. Only present in debug builds; use
    /// [`candidate_log!`](crate::candidate_log) to append.
    #[cfg(debug_assertions)]
    #[serde(skip)]
    pub log: String,
}

impl Candidate {
    /// Creates an empty candidate. Same as `Candidate::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every field to its default value.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Appends one inner-segment boundary entry.
    ///
    /// The boundary sequence is left unchanged on failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthOverflow`](crate::Error::LengthOverflow) if
    /// any length exceeds 255.
    pub fn push_back_inner_segment_boundary(
        &mut self,
        key_len: usize,
        value_len: usize,
        content_key_len: usize,
        content_value_len: usize,
    ) -> Result<()> {
        let code =
            BoundaryCode::encode(key_len, value_len, content_key_len, content_value_len)?;
        self.inner_segment_boundary.push(code);
        Ok(())
    }

    /// Iterates the inner segments recorded by real-time conversion.
    ///
    /// Yields nothing when `inner_segment_boundary` is empty.
    #[must_use]
    pub fn inner_segments(&self) -> InnerSegmentIter<'_> {
        InnerSegmentIter::new(self)
    }

    /// The reading past the content prefix.
    ///
    /// Empty when `content_key` covers the whole of `key` (never an
    /// error).
    #[must_use]
    pub fn functional_key(&self) -> &str {
        if self.key.len() <= self.content_key.len() {
            ""
        } else {
            &self.key[self.content_key.len()..]
        }
    }

    /// The surface past the content prefix.
    ///
    /// Empty when `content_value` covers the whole of `value`.
    #[must_use]
    pub fn functional_value(&self) -> &str {
        if self.value.len() <= self.content_value.len() {
            ""
        } else {
            &self.value[self.content_value.len()..]
        }
    }

    /// Checks that `inner_segment_boundary` is consistent with `key` and
    /// `value`: the decoded key lengths must sum to `key.len()` and the
    /// decoded value lengths to `value.len()`. An empty boundary is always
    /// valid.
    ///
    /// `content_key` and `content_value` are not checked; the top-level
    /// content prefix cannot be reconstructed from the inner segments.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.inner_segment_boundary.is_empty() {
            return true;
        }
        let mut key_total = 0usize;
        let mut value_total = 0usize;
        for code in &self.inner_segment_boundary {
            key_total += code.key_len();
            value_total += code.value_len();
        }
        if key_total != self.key.len() || value_total != self.value.len() {
            log::debug!(
                "inconsistent inner segment boundary: key {}/{} value {}/{} for {:?}",
                key_total,
                self.key.len(),
                value_total,
                self.value.len(),
                self.key
            );
            return false;
        }
        true
    }

    /// Appends a trace line to the debug log. Compiled out of release
    /// builds; prefer the [`candidate_log!`](crate::candidate_log) macro,
    /// which stamps the call site.
    #[cfg(debug_assertions)]
    pub fn dlog(&mut self, file: &str, line: u32, message: &str) {
        use std::fmt::Write;
        let _ = writeln!(self.log, "{file}:{line} {message}");
    }

    /// No-op in release builds.
    #[cfg(not(debug_assertions))]
    #[inline(always)]
    pub fn dlog(&mut self, _file: &str, _line: u32, _message: &str) {}
}

impl PartialEq for Candidate {
    /// Structural equality over content fields. The debug-only trace is
    /// bookkeeping, not content, so equality is identical in debug and
    /// release builds.
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.value == other.value
            && self.content_key == other.content_key
            && self.content_value == other.content_value
            && self.consumed_key_size == other.consumed_key_size
            && self.prefix == other.prefix
            && self.suffix == other.suffix
            && self.description == other.description
            && self.a11y_description == other.a11y_description
            && self.usage_id == other.usage_id
            && self.usage_title == other.usage_title
            && self.usage_description == other.usage_description
            && self.cost == other.cost
            && self.wcost == other.wcost
            && self.structure_cost == other.structure_cost
            && self.lid == other.lid
            && self.rid == other.rid
            && self.attributes == other.attributes
            && self.source_info == other.source_info
            && self.category == other.category
            && self.style == other.style
            && self.command == other.command
            && self.inner_segment_boundary == other.inner_segment_boundary
            && self.cost_before_rescoring == other.cost_before_rescoring
    }
}

impl Eq for Candidate {}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)?;
        if !self.content_key.is_empty() || !self.content_value.is_empty() {
            write!(f, " content={}:{}", self.content_key, self.content_value)?;
        }
        write!(
            f,
            " cost={} scost={} wcost={} lid={} rid={}",
            self.cost, self.structure_cost, self.wcost, self.lid, self.rid
        )?;
        if !self.attributes.is_empty() {
            write!(f, " attributes={}", self.attributes)?;
        }
        if !self.description.is_empty() {
            write!(f, " {}", self.description)?;
        }
        if !self.inner_segment_boundary.is_empty() {
            write!(f, " inner_boundary=[")?;
            for (i, code) in self.inner_segment_boundary.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{code}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Appends a message to a candidate's debug trace, stamped with the call
/// site. Expands to nothing observable in release builds.
#[macro_export]
macro_rules! candidate_log {
    ($candidate:expr, $message:expr) => {
        $candidate.dlog(file!(), line!(), $message)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_bit_positions() {
        // These values are ABI; renumbering breaks persisted usage stats.
        assert_eq!(Attributes::BEST_CANDIDATE.bits(), 1 << 0);
        assert_eq!(Attributes::RERANKED.bits(), 1 << 1);
        assert_eq!(Attributes::NO_HISTORY_LEARNING.bits(), 1 << 2);
        assert_eq!(Attributes::NO_SUGGEST_LEARNING.bits(), 1 << 3);
        assert_eq!(Attributes::CONTEXT_SENSITIVE.bits(), 1 << 4);
        assert_eq!(Attributes::SPELLING_CORRECTION.bits(), 1 << 5);
        assert_eq!(Attributes::NO_VARIANTS_EXPANSION.bits(), 1 << 6);
        assert_eq!(Attributes::NO_EXTRA_DESCRIPTION.bits(), 1 << 7);
        assert_eq!(Attributes::REALTIME_CONVERSION.bits(), 1 << 8);
        assert_eq!(Attributes::USER_DICTIONARY.bits(), 1 << 9);
        assert_eq!(Attributes::COMMAND_CANDIDATE.bits(), 1 << 10);
        assert_eq!(Attributes::PARTIALLY_KEY_CONSUMED.bits(), 1 << 11);
        assert_eq!(Attributes::TYPING_CORRECTION.bits(), 1 << 12);
        assert_eq!(Attributes::AUTO_PARTIAL_SUGGESTION.bits(), 1 << 13);
        assert_eq!(Attributes::USER_HISTORY_PREDICTION.bits(), 1 << 14);
        assert_eq!(Attributes::SUFFIX_DICTIONARY.bits(), 1 << 15);
        assert_eq!(Attributes::NO_MODIFICATION.bits(), 1 << 16);
    }

    #[test]
    fn test_no_learning_is_the_union() {
        assert_eq!(
            Attributes::NO_LEARNING,
            Attributes::NO_HISTORY_LEARNING | Attributes::NO_SUGGEST_LEARNING
        );
        let mut attributes = Attributes::NONE;
        attributes.insert(Attributes::NO_HISTORY_LEARNING);
        assert!(attributes.intersects(Attributes::NO_LEARNING));
        assert!(!attributes.contains(Attributes::NO_LEARNING));
        attributes.insert(Attributes::NO_SUGGEST_LEARNING);
        assert!(attributes.contains(Attributes::NO_LEARNING));
    }

    #[test]
    fn test_attribute_set_operations() {
        let mut attributes = Attributes::RERANKED | Attributes::USER_DICTIONARY;
        assert!(attributes.contains(Attributes::RERANKED));
        attributes.remove(Attributes::RERANKED);
        assert!(!attributes.contains(Attributes::RERANKED));
        assert!(attributes.contains(Attributes::USER_DICTIONARY));
        assert_eq!(
            Attributes::from_bits(attributes.bits()),
            Attributes::USER_DICTIONARY
        );
    }

    #[test]
    fn test_attributes_display() {
        assert_eq!(Attributes::NONE.to_string(), "NONE");
        let attributes = Attributes::BEST_CANDIDATE | Attributes::RERANKED;
        assert_eq!(attributes.to_string(), "BEST_CANDIDATE|RERANKED");
    }

    #[test]
    fn test_source_info_bit_positions() {
        assert_eq!(
            SourceInfo::DICTIONARY_PREDICTOR_ZERO_QUERY_NONE.bits(),
            1 << 0
        );
        assert_eq!(
            SourceInfo::DICTIONARY_PREDICTOR_ZERO_QUERY_NUMBER_SUFFIX.bits(),
            1 << 1
        );
        assert_eq!(
            SourceInfo::DICTIONARY_PREDICTOR_ZERO_QUERY_EMOTICON.bits(),
            1 << 2
        );
        assert_eq!(
            SourceInfo::DICTIONARY_PREDICTOR_ZERO_QUERY_EMOJI.bits(),
            1 << 3
        );
        assert_eq!(
            SourceInfo::DICTIONARY_PREDICTOR_ZERO_QUERY_BIGRAM.bits(),
            1 << 4
        );
        assert_eq!(
            SourceInfo::DICTIONARY_PREDICTOR_ZERO_QUERY_SUFFIX.bits(),
            1 << 5
        );
        assert_eq!(SourceInfo::USER_HISTORY_PREDICTOR.bits(), 1 << 6);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut candidate = Candidate::new();
        candidate.key = "かんじ".to_string();
        candidate.value = "漢字".to_string();
        candidate.cost = 1234;
        candidate.lid = 7;
        candidate.attributes = Attributes::RERANKED;
        candidate.category = Category::Symbol;
        candidate.command = Command::EnableIncognito;
        candidate.style = NumberStyle::Kanji;
        candidate
            .push_back_inner_segment_boundary(9, 6, 9, 6)
            .unwrap();

        candidate.clear();
        assert_eq!(candidate, Candidate::default());
    }

    #[test]
    fn test_functional_key_and_value() {
        let mut candidate = Candidate::new();
        candidate.key = "はしった".to_string();
        candidate.value = "走った".to_string();
        candidate.content_key = "はし".to_string();
        candidate.content_value = "走".to_string();
        assert_eq!(candidate.functional_key(), "った");
        assert_eq!(candidate.functional_value(), "った");
        assert_eq!(
            candidate.functional_key().len(),
            candidate.key.len() - candidate.content_key.len()
        );
    }

    #[test]
    fn test_functional_key_saturates() {
        let mut candidate = Candidate::new();
        candidate.key = "あ".to_string();
        candidate.content_key = "あいう".to_string();
        assert_eq!(candidate.functional_key(), "");
        assert_eq!(candidate.functional_value(), "");
    }

    #[test]
    fn test_is_valid_empty_boundary() {
        let mut candidate = Candidate::new();
        candidate.key = "なんでも".to_string();
        candidate.value = "何でも".to_string();
        assert!(candidate.is_valid());
    }

    #[test]
    fn test_is_valid_checks_sums() {
        let mut candidate = Candidate::new();
        candidate.key = "くるまのほうが".to_string();
        candidate.value = "車のほうが".to_string();
        candidate
            .push_back_inner_segment_boundary(9, 3, 9, 3)
            .unwrap();
        assert!(!candidate.is_valid()); // key only partially covered
        candidate
            .push_back_inner_segment_boundary(12, 12, 12, 12)
            .unwrap();
        assert!(candidate.is_valid());
    }

    #[test]
    fn test_push_back_boundary_overflow_leaves_sequence_unchanged() {
        let mut candidate = Candidate::new();
        candidate
            .push_back_inner_segment_boundary(3, 3, 3, 3)
            .unwrap();
        let before = candidate.inner_segment_boundary.clone();
        assert!(candidate
            .push_back_inner_segment_boundary(256, 3, 3, 3)
            .is_err());
        assert_eq!(candidate.inner_segment_boundary, before);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_equality_ignores_debug_trace() {
        let mut a = Candidate::new();
        a.value = "同じ".to_string();
        let mut b = a.clone();
        candidate_log!(&mut b, "only b has a trace");
        assert_ne!(a.log, b.log);
        assert_eq!(a, b);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_candidate_log_records_call_site() {
        let mut candidate = Candidate::new();
        candidate_log!(&mut candidate, "rewriter dropped description");
        assert!(candidate.log.contains("rewriter dropped description"));
        assert!(candidate.log.contains("candidate.rs"));
    }

    #[test]
    fn test_display_is_readable() {
        let mut candidate = Candidate::new();
        candidate.key = "きょう".to_string();
        candidate.value = "今日".to_string();
        candidate.cost = 500;
        candidate.attributes = Attributes::BEST_CANDIDATE;
        let dump = candidate.to_string();
        assert!(dump.contains("きょう:今日"));
        assert!(dump.contains("cost=500"));
        assert!(dump.contains("BEST_CANDIDATE"));
    }
}
