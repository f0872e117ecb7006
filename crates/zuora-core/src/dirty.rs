//! Track which fields changed since a record was loaded or last saved.
//!
//! Partial updates send only changed fields, and a successful save archives the
//! change set as "previously changed" so callers can still inspect what went out.

/// A compact bitset over field positions `0..len`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldsSet {
    len: usize,
    bits: Box<[u64]>,
}

impl FieldsSet {
    /// Create an empty set for `len` fields.
    #[must_use]
    pub fn empty(len: usize) -> Self {
        let words = len.div_ceil(64);
        Self {
            len,
            bits: vec![0u64; words].into_boxed_slice(),
        }
    }

    /// Number of field positions this set covers.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.len
    }

    /// Mark a position. Out-of-range positions are ignored.
    pub fn set(&mut self, idx: usize) {
        if idx >= self.len {
            return;
        }
        if let Some(w) = self.bits.get_mut(idx / 64) {
            *w |= 1u64 << (idx % 64);
        }
    }

    #[must_use]
    pub fn is_set(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        self.bits
            .get(idx / 64)
            .is_some_and(|w| (w & (1u64 << (idx % 64))) != 0)
    }

    /// True when no position is marked.
    #[must_use]
    pub fn none(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|w| *w = 0);
    }

    /// Marked positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|idx| self.is_set(*idx))
    }
}

/// Active and archived change sets for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyTracker {
    active: FieldsSet,
    previous: FieldsSet,
}

impl DirtyTracker {
    /// A tracker with nothing changed.
    #[must_use]
    pub fn clean(len: usize) -> Self {
        Self {
            active: FieldsSet::empty(len),
            previous: FieldsSet::empty(len),
        }
    }

    pub fn mark_dirty(&mut self, idx: usize) {
        self.active.set(idx);
    }

    #[must_use]
    pub fn is_dirty(&self, idx: usize) -> bool {
        self.active.is_set(idx)
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.active.none()
    }

    /// Positions changed since the last commit.
    #[must_use]
    pub fn changed(&self) -> &FieldsSet {
        &self.active
    }

    /// Positions that went out with the last successful save.
    #[must_use]
    pub fn previously_changed(&self) -> &FieldsSet {
        &self.previous
    }

    /// Archive the active set as previously changed and start clean.
    pub fn commit(&mut self) {
        self.previous = self.active.clone();
        self.active.clear();
    }
}
