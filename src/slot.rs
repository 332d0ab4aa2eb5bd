use core::mem;

/// A live key-value pair stored in a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

/// The state of a slot in the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot<K, V> {
    /// Never written since the slot array was allocated. Ends every probe chain.
    Empty,
    /// Held an entry that was removed. Still counts as used and never ends a probe chain.
    Tombstone,
    Occupied(Entry<K, V>),
}

impl<K, V> Slot<K, V> {
    #[inline(always)]
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline(always)]
    pub(crate) const fn is_tombstone(&self) -> bool {
        matches!(self, Slot::Tombstone)
    }

    #[inline(always)]
    pub(crate) const fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }

    #[inline(always)]
    pub(crate) const fn entry(&self) -> Option<&Entry<K, V>> {
        match self {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }

    #[inline(always)]
    pub(crate) fn entry_mut(&mut self) -> Option<&mut Entry<K, V>> {
        match self {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }

    /// Replaces an occupied slot with a tombstone and returns the entry it held.
    ///
    /// Empty slots and tombstones are left as they are.
    #[inline]
    pub(crate) fn bury(&mut self) -> Option<Entry<K, V>> {
        if !self.is_occupied() {
            return None;
        }
        match mem::replace(self, Slot::Tombstone) {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }

    /// Takes the live entry out of the slot, leaving it empty.
    #[inline]
    pub(crate) fn take(&mut self) -> Option<Entry<K, V>> {
        match mem::replace(self, Slot::Empty) {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Allocates `cap` empty slots.
pub(crate) fn empty_slots<K, V>(cap: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(cap);
    slots.resize_with(cap, || Slot::Empty);
    slots
}
