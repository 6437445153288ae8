//! Cached lattice owned by the segment container.
//!
//! The container keeps one lattice instance alive across conversions so
//! the converter can reuse its allocations instead of rebuilding the
//! search graph from scratch per keystroke. The container itself never
//! reads it; the converter owns its interpretation entirely.

/// Opaque Viterbi search graph, cached between conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lattice {
    key: String,
}

impl Lattice {
    /// Creates an empty lattice.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The reading this lattice was last built for.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Records the reading the converter is building the lattice for.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Discards the cached graph.
    pub fn clear(&mut self) {
        self.key.clear();
    }

    /// True when no conversion has populated the cache yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_cache_cycle() {
        let mut lattice = Lattice::new();
        assert!(lattice.is_empty());
        lattice.set_key("わたしのなまえ");
        assert_eq!(lattice.key(), "わたしのなまえ");
        assert!(!lattice.is_empty());
        lattice.clear();
        assert!(lattice.is_empty());
    }
}
