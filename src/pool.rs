//! Free-list allocation for churn-heavy container elements.
//!
//! Conversion rebuilds candidates on every keystroke. Boxed slots recycled
//! through a free list keep element addresses stable across deque edits
//! and avoid re-allocating on each rebuild.

/// An element that can be recycled through a [`Pool`].
pub(crate) trait Reusable: Default {
    /// Returns the element to its default state before reuse.
    fn reset(&mut self);
}

/// LIFO free list of boxed slots.
///
/// `alloc` hands out a cleared slot, reusing a released one when
/// available. Because slots are boxed, the element address never changes
/// while the slot is live, no matter how its owning deque is edited.
#[derive(Debug)]
pub(crate) struct Pool<T: Reusable> {
    free: Vec<Box<T>>,
}

impl<T: Reusable> Pool<T> {
    /// Creates a pool with `reserve` slots pre-allocated.
    pub(crate) fn with_reserve(reserve: usize) -> Self {
        Self {
            free: (0..reserve).map(|_| Box::new(T::default())).collect(),
        }
    }

    /// Takes a cleared slot from the free list, allocating when empty.
    pub(crate) fn alloc(&mut self) -> Box<T> {
        match self.free.pop() {
            Some(mut slot) => {
                slot.reset();
                slot
            }
            None => Box::new(T::default()),
        }
    }

    /// Returns a slot to the free list for reuse.
    pub(crate) fn release(&mut self, slot: Box<T>) {
        self.free.push(slot);
    }
}
