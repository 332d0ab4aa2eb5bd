use core::cell::Cell;
use core::fmt::{self, Debug, Display};
use core::mem;
use core::ops::{Index, IndexMut};

use std::borrow::Cow;

use crate::config::TableConfig;
use crate::error::TableError;
use crate::hash::{KeyEq, KeyHash, StdEq, StdHash};
use crate::probe::{LinearProber, Probe, ProbeStrategy};
use crate::slot::{empty_slots, Entry, Slot};

/// Outcome of walking a probe sequence for a key.
enum Located {
    /// A live slot holding the key.
    Found(usize),
    /// The first empty slot of the sequence; the key is absent.
    Vacant(usize),
    /// Every candidate was visited without reaching either.
    Exhausted,
}

/// An open-addressing hash table.
///
/// Entries live directly in a slot array whose length is always a rung of the capacity ladder.
/// Collisions are resolved by the probe strategy `P`; keys are hashed with `H` and compared
/// with `E`. Removal leaves a tombstone behind, which keeps probe chains intact and still counts
/// towards the load factor until the next growth drops it.
///
/// The table is single-threaded: lookups through `&self` update a probe counter held in a
/// [`Cell`], so the table is not [`Sync`].
#[derive(Clone)]
pub struct HashTable<K, V, P = LinearProber, H = StdHash, E = StdEq> {
    slots: Vec<Slot<K, V>>,
    ladder: Cow<'static, [usize]>,
    capacity_index: usize,
    max_load_factor: f64,
    // Occupied slots.
    active: usize,
    // Occupied slots and tombstones.
    used: usize,
    probes: Cell<usize>,
    prober: P,
    hasher: H,
    key_eq: E,
}

impl<K, V> HashTable<K, V> {
    /// Returns an empty table on the first rung of the default ladder, with a maximum load
    /// factor of `0.4`, linear probing and std hashing.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::HashTable;
    ///
    /// let table: HashTable<u32, &str> = HashTable::new();
    ///
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 11);
    /// assert_eq!(table.max_load_factor(), 0.4);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_parts(TableConfig::default(), LinearProber, StdHash, StdEq)
    }

    /// Returns an empty table sized by `config`, with linear probing and std hashing.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::{HashTable, TableConfig};
    ///
    /// let config = TableConfig {
    ///     capacity_index: 2,
    ///     ..TableConfig::default()
    /// };
    /// let table: HashTable<u32, u32> = HashTable::with_config(config)?;
    ///
    /// assert_eq!(table.capacity(), 47);
    /// # Ok::<(), probemap::TableError>(())
    /// ```
    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::with_parts(config, LinearProber, StdHash, StdEq)
    }
}

impl<K, V> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// Constructors.
impl<K, V, P, H, E> HashTable<K, V, P, H, E> {
    /// Returns an empty table built from validated `config` and the given strategies.
    pub fn with_parts(
        config: TableConfig,
        prober: P,
        hasher: H,
        key_eq: E,
    ) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Self::from_valid_parts(config, prober, hasher, key_eq))
    }

    fn from_valid_parts(config: TableConfig, prober: P, hasher: H, key_eq: E) -> Self {
        let cap = config.initial_capacity();

        tracing::trace!(
            capacity = cap,
            capacity_index = config.capacity_index,
            max_load_factor = config.max_load_factor,
            "created hash table"
        );

        Self {
            slots: empty_slots(cap),
            ladder: config.ladder,
            capacity_index: config.capacity_index,
            max_load_factor: config.max_load_factor,
            active: 0,
            used: 0,
            probes: Cell::new(0),
            prober,
            hasher,
            key_eq,
        }
    }
}

// Accessors that never probe.
impl<K, V, P, H, E> HashTable<K, V, P, H, E> {
    /// Returns the number of live entries.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.active
    }

    /// Returns `true` if the table holds no live entry.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Returns the number of slots, the current rung of the capacity ladder.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the position of the current capacity in the ladder.
    #[inline(always)]
    pub fn capacity_index(&self) -> usize {
        self.capacity_index
    }

    /// Returns the capacity ladder the table grows through.
    #[inline(always)]
    pub fn ladder(&self) -> &[usize] {
        &self.ladder
    }

    /// Returns the number of slots holding a live entry or a tombstone.
    #[inline(always)]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline(always)]
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Returns `used / capacity`, the ratio growth decisions are based on.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.insert(1, "a")?;
    /// table.insert(2, "b")?;
    /// table.remove(&2);
    ///
    /// // The tombstone left by the removal still counts.
    /// assert_eq!(table.load_factor(), 2.0 / 11.0);
    /// # Ok::<(), probemap::TableError>(())
    /// ```
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.used as f64 / self.capacity() as f64
    }

    /// Returns the number of probe steps taken since the table was created or the counter was
    /// last reset.
    ///
    /// Every call to the prober counts, including the one that reports exhaustion and the ones
    /// made while growing. The counter has no effect on the table's behavior.
    #[inline(always)]
    pub fn total_probes(&self) -> usize {
        self.probes.get()
    }

    #[inline(always)]
    pub fn reset_probe_counter(&self) {
        self.probes.set(0);
    }

    #[inline(always)]
    fn count_probe(&self) {
        self.probes.set(self.probes.get().wrapping_add(1));
    }

    /// Returns the live entries as `(slot, key, value)` in slot order.
    pub fn report(&self) -> impl Iterator<Item = (usize, &K, &V)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, s)| s.entry().map(|entry| (slot, &entry.key, &entry.value)))
    }

    /// Returns the live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots
            .iter()
            .filter_map(|s| s.entry().map(|entry| (&entry.key, &entry.value)))
    }

    /// Returns the live entries in slot order, with mutable values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.slots
            .iter_mut()
            .filter_map(|s| s.entry_mut().map(|entry| (&entry.key, &mut entry.value)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Writes one `Bucket <slot>: <key> -> <value>` line per live entry, in slot order.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::TableBuilder;
    ///
    /// let mut table = TableBuilder::new()
    ///     .hasher(|k: &u32| *k as usize)
    ///     .build()?;
    /// table.insert(3, "three")?;
    /// table.insert(1, "one")?;
    ///
    /// let mut out = String::new();
    /// table.report_all(&mut out).unwrap();
    ///
    /// assert_eq!(out, "Bucket 1: 1 -> one\nBucket 3: 3 -> three\n");
    /// # Ok::<(), probemap::TableError>(())
    /// ```
    pub fn report_all<W: fmt::Write>(&self, out: &mut W) -> fmt::Result
    where
        K: Display,
        V: Display,
    {
        for (slot, key, value) in self.report() {
            writeln!(out, "Bucket {slot}: {key} -> {value}")?;
        }
        Ok(())
    }

    /// Returns `true` if inserting one more entry into a fresh slot would reach the maximum load
    /// factor at `capacity` with `used` slots taken.
    #[inline(always)]
    fn reaches_load_limit(&self, used: usize, capacity: usize) -> bool {
        (used + 1) as f64 / capacity as f64 >= self.max_load_factor
    }

    /// Returns the first rung above the current one that keeps the next insert below the load
    /// limit once tombstones are dropped, or the last rung if none does.
    fn growth_target(&self) -> Result<usize, TableError> {
        let last = self.ladder.len() - 1;
        if self.capacity_index >= last {
            return Err(TableError::CapacityExhausted {
                capacity: self.capacity(),
            });
        }

        let target = (self.capacity_index + 1..last)
            .find(|&index| !self.reaches_load_limit(self.active, self.ladder[index]))
            .unwrap_or(last);
        Ok(target)
    }
}

impl<K, V, P, H, E> HashTable<K, V, P, H, E>
where
    P: ProbeStrategy<K>,
    H: KeyHash<K>,
    E: KeyEq<K>,
{
    /// Walks the probe sequence of `key`.
    ///
    /// Tombstones are stepped over. The walk stops at the first empty slot or at a live slot
    /// holding `key`.
    fn locate(&self, key: &K) -> Result<Located, TableError> {
        let cap = self.capacity();
        let start = self.hasher.hash_key(key) % cap;
        let mut state = self.prober.init(start, cap, key);

        loop {
            let probe = self.prober.next(&mut state);
            self.count_probe();

            match probe? {
                Probe::Slot(slot) => match &self.slots[slot] {
                    Slot::Empty => return Ok(Located::Vacant(slot)),
                    Slot::Occupied(entry) if self.key_eq.keys_equal(&entry.key, key) => {
                        return Ok(Located::Found(slot));
                    }
                    _ => {}
                },
                Probe::Exhausted => return Ok(Located::Exhausted),
            }
        }
    }

    /// Returns the slot of the live entry for `key`.
    fn find_slot(&self, key: &K) -> Result<usize, TableError> {
        match self.locate(key)? {
            Located::Found(slot) => Ok(slot),
            Located::Vacant(_) | Located::Exhausted => Err(TableError::KeyNotFound),
        }
    }

    /// Moves to the next rung of the capacity ladder.
    ///
    /// Every live entry is placed again by replaying its probe sequence against the new
    /// capacity; tombstones are dropped. On error the table is left untouched.
    ///
    /// # Errors
    ///
    /// [`TableError::CapacityExhausted`] if the table is on the last rung.
    pub fn grow(&mut self) -> Result<(), TableError> {
        let next = self.capacity_index + 1;
        if next >= self.ladder.len() {
            tracing::warn!(capacity = self.capacity(), "capacity ladder exhausted");
            return Err(TableError::CapacityExhausted {
                capacity: self.capacity(),
            });
        }
        self.rehash(next)
    }

    /// Rebuilds the slot array at the rung `index`.
    ///
    /// Target slots are computed first against an occupancy map, so a failed placement returns
    /// before any entry moves.
    fn rehash(&mut self, index: usize) -> Result<(), TableError> {
        let old_cap = self.capacity();
        let new_cap = self.ladder[index];

        let mut taken = vec![false; new_cap];
        let mut placements = Vec::with_capacity(self.active);

        for (from, slot) in self.slots.iter().enumerate() {
            let Some(entry) = slot.entry() else {
                continue;
            };
            match self.probe_occupancy(&taken, &entry.key)? {
                Some(to) => {
                    taken[to] = true;
                    placements.push((from, to));
                }
                None => {
                    tracing::warn!(capacity = new_cap, "no free slot while growing");
                    return Err(TableError::TableFull { capacity: new_cap });
                }
            }
        }

        let mut slots = empty_slots(new_cap);
        for (from, to) in placements {
            if let Some(entry) = self.slots[from].take() {
                slots[to] = Slot::Occupied(entry);
            }
        }

        let dropped = self.used - self.active;
        self.slots = slots;
        self.capacity_index = index;
        self.used = self.active;

        tracing::debug!(
            from = old_cap,
            to = new_cap,
            live = self.active,
            dropped_tombstones = dropped,
            "grew hash table"
        );

        Ok(())
    }

    /// Returns the first empty slot of the probe sequence of `key` in an occupancy map.
    fn probe_occupancy(&self, taken: &[bool], key: &K) -> Result<Option<usize>, TableError> {
        let cap = taken.len();
        let start = self.hasher.hash_key(key) % cap;
        let mut state = self.prober.init(start, cap, key);

        loop {
            let probe = self.prober.next(&mut state);
            self.count_probe();

            match probe? {
                Probe::Slot(slot) if !taken[slot] => return Ok(Some(slot)),
                Probe::Slot(_) => {}
                Probe::Exhausted => return Ok(None),
            }
        }
    }

    /// Inserts `value` under `key`.
    ///
    /// If `(used + 1) / capacity` would reach the maximum load factor, the table grows first.
    /// The entry then goes into the first empty slot of the key's probe sequence, unless a live
    /// entry with the same key is met on the way, in which case only its value is replaced.
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: the key was new.
    ///
    /// - `Ok(Some(old))`: the key was present and `old` is its previous value.
    ///
    /// # Errors
    ///
    /// - [`TableError::CapacityExhausted`] if growth is needed on the last rung. The table is
    ///   left exactly as it was.
    ///
    /// - [`TableError::TableFull`] if the probe sequence ran out of candidates.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::HashTable;
    ///
    /// let mut table = HashTable::new();
    ///
    /// assert_eq!(table.insert("one", 1)?, None);
    /// assert_eq!(table.insert("one", 2)?, Some(1));
    ///
    /// assert_eq!(table.len(), 1);
    /// assert_eq!(table.find(&"one"), Some(&2));
    /// # Ok::<(), probemap::TableError>(())
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        if self.reaches_load_limit(self.used, self.capacity()) {
            let target = self.growth_target().inspect_err(|_| {
                tracing::warn!(capacity = self.capacity(), "capacity ladder exhausted");
            })?;
            self.rehash(target)?;
        }

        match self.locate(&key)? {
            Located::Found(slot) => {
                let old = self.slots[slot]
                    .entry_mut()
                    .map(|entry| mem::replace(&mut entry.value, value));
                Ok(old)
            }
            Located::Vacant(slot) => {
                self.slots[slot] = Slot::Occupied(Entry { key, value });
                self.active += 1;
                self.used += 1;
                Ok(None)
            }
            Located::Exhausted => {
                tracing::warn!(capacity = self.capacity(), "probe sequence exhausted on insert");
                Err(TableError::TableFull {
                    capacity: self.capacity(),
                })
            }
        }
    }

    /// Removes the entry for `key`, leaving a tombstone in its slot, and returns its value.
    ///
    /// Removing an absent key does nothing. The tombstone keeps counting towards the load
    /// factor until the next growth.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.insert(1, "a")?;
    ///
    /// assert_eq!(table.remove(&1), Some("a"));
    /// assert_eq!(table.remove(&1), None);
    ///
    /// assert!(table.is_empty());
    /// assert_eq!(table.used(), 1);
    /// # Ok::<(), probemap::TableError>(())
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.find_slot(key).ok()?;
        let entry = self.slots[slot].bury()?;
        self.active -= 1;
        Some(entry.value)
    }

    /// Returns a reference to the value of `key`, or `None` if it has no live entry.
    ///
    /// Tombstones on the way are stepped over; the first empty slot ends the search.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&V> {
        self.at(key).ok()
    }

    #[must_use]
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        self.at_mut(key).ok()
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_slot(key).is_ok()
    }

    /// Returns a reference to the value of `key`.
    ///
    /// # Errors
    ///
    /// [`TableError::KeyNotFound`] if `key` has no live entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::{HashTable, TableError};
    ///
    /// let mut table = HashTable::new();
    /// table.insert('x', 10)?;
    ///
    /// assert_eq!(table.at(&'x'), Ok(&10));
    /// assert_eq!(table.at(&'y'), Err(TableError::KeyNotFound));
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn at(&self, key: &K) -> Result<&V, TableError> {
        let slot = self.find_slot(key)?;
        self.slots[slot]
            .entry()
            .map(|entry| &entry.value)
            .ok_or(TableError::KeyNotFound)
    }

    pub fn at_mut(&mut self, key: &K) -> Result<&mut V, TableError> {
        let slot = self.find_slot(key)?;
        self.slots[slot]
            .entry_mut()
            .map(|entry| &mut entry.value)
            .ok_or(TableError::KeyNotFound)
    }
}

impl<K, V, P, H, E> Index<&K> for HashTable<K, V, P, H, E>
where
    P: ProbeStrategy<K>,
    H: KeyHash<K>,
    E: KeyEq<K>,
{
    type Output = V;

    /// Returns the value of `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` has no live entry. Use [`HashTable::at`] to get an error instead.
    fn index(&self, key: &K) -> &V {
        match self.at(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V, P, H, E> IndexMut<&K> for HashTable<K, V, P, H, E>
where
    P: ProbeStrategy<K>,
    H: KeyHash<K>,
    E: KeyEq<K>,
{
    fn index_mut(&mut self, key: &K) -> &mut V {
        match self.at_mut(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V, P, H, E> PartialEq for HashTable<K, V, P, H, E>
where
    V: PartialEq,
    P: ProbeStrategy<K>,
    H: KeyHash<K>,
    E: KeyEq<K>,
{
    /// Two tables are equal when they hold the same keys with equal values, regardless of
    /// capacity or slot layout.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.find(key) == Some(value))
    }
}

impl<K, V, P, H, E> Debug for HashTable<K, V, P, H, E>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, P, H, E> Display for HashTable<K, V, P, H, E>
where
    K: Display,
    V: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (key, value) in self.iter() {
            writeln!(f, "    {key}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// Inspection helpers for tests.
#[cfg(test)]
impl<K, V, P, H, E> HashTable<K, V, P, H, E> {
    /// Returns the live key stored at `slot`.
    pub(crate) fn debug_key_at(&self, slot: usize) -> Option<&K> {
        self.slots[slot].entry().map(|entry| &entry.key)
    }

    pub(crate) fn debug_is_tombstone(&self, slot: usize) -> bool {
        self.slots[slot].is_tombstone()
    }

    pub(crate) fn debug_tombstones(&self) -> usize {
        self.slots.iter().filter(|s| s.is_tombstone()).count()
    }

    pub(crate) fn debug_occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }
}
