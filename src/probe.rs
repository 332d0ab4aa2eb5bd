use crate::error::TableError;
use crate::hash::{KeyHash, StdHash};

/// Moduli used to derive the double hashing step, one per rung of the default capacity ladder.
///
/// Each value is a prime at or just below the matching ladder rung.
pub const DOUBLE_HASH_MODULI: [usize; 28] = [
    7, 19, 43, 89, 193, 389, 787, 1583, 3191, 6397, 12841, 25703, 51431, 102871, 205721, 411503,
    823051, 1646221, 3292463, 6584957, 13169963, 26339921, 52679927, 105359939, 210719881,
    421439749, 842879563, 1685759113,
];

/// One step of a probe sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// The next candidate slot.
    Slot(usize),
    /// Every one of the `capacity` candidates has been produced.
    Exhausted,
}

/// The position of a probe sequence for one `(start, capacity, key)` triple.
///
/// A sequence yields exactly `capacity` slots, `(start + i * step) % capacity` for
/// `i = 0..capacity`, then [`Probe::Exhausted`] once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeState {
    start: usize,
    capacity: usize,
    step: usize,
    taken: usize,
    exhausted: bool,
}

impl ProbeState {
    /// Creates a sequence with the given stride.
    ///
    /// A stride that is a multiple of `capacity` revisits `start` on every step; the sequence
    /// still ends after `capacity` candidates.
    #[must_use]
    #[inline]
    pub const fn new(start: usize, capacity: usize, step: usize) -> Self {
        let start = if capacity == 0 { 0 } else { start % capacity };
        Self {
            start,
            capacity,
            step,
            taken: 0,
            exhausted: false,
        }
    }

    /// Number of slots produced so far.
    #[inline(always)]
    pub const fn taken(&self) -> usize {
        self.taken
    }

    /// The stride between consecutive candidates.
    #[inline(always)]
    pub const fn step(&self) -> usize {
        self.step
    }

    #[inline(always)]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Produces the next candidate slot.
    ///
    /// The offset `taken * step` is reduced before it is added to `start`, so the computation
    /// cannot overflow for any capacity up to `usize::MAX / 2`.
    #[inline]
    pub fn advance(&mut self) -> Result<Probe, TableError> {
        if self.exhausted {
            return Err(TableError::ProberMisuse);
        }
        if self.taken >= self.capacity {
            self.exhausted = true;
            return Ok(Probe::Exhausted);
        }

        let offset = mul_mod(self.taken, self.step, self.capacity);
        let slot = (self.start + offset) % self.capacity;
        self.taken += 1;
        Ok(Probe::Slot(slot))
    }
}

/// Returns `(a * b) % m` without overflowing.
#[inline(always)]
fn mul_mod(a: usize, b: usize, m: usize) -> usize {
    match a.checked_mul(b) {
        Some(product) => product % m,
        None => ((a as u128 * b as u128) % m as u128) as usize,
    }
}

/// A collision resolution strategy for open addressing.
///
/// The strategy is fixed when the table is built. A sequence for a given `(start, capacity,
/// key)` must always be identical, since lookups retrace the path used by insertion.
pub trait ProbeStrategy<K: ?Sized> {
    /// Starts a new probe sequence.
    fn init(&self, start: usize, capacity: usize, key: &K) -> ProbeState;

    /// Produces the next candidate slot of `state`.
    ///
    /// Returns [`TableError::ProberMisuse`] if `state` has already returned
    /// [`Probe::Exhausted`].
    #[inline]
    fn next(&self, state: &mut ProbeState) -> Result<Probe, TableError> {
        state.advance()
    }
}

/// Probes consecutive slots, wrapping around at the end of the table.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearProber;

impl<K: ?Sized> ProbeStrategy<K> for LinearProber {
    #[inline]
    fn init(&self, start: usize, capacity: usize, _key: &K) -> ProbeState {
        ProbeState::new(start, capacity, 1)
    }
}

/// Probes with a stride derived from a secondary hash of the key.
///
/// The stride is `m - h2(key) % m`, where `m` is the largest entry of [`DOUBLE_HASH_MODULI`]
/// below the table capacity, or the first entry when the capacity is smaller than all of them.
#[derive(Clone, Debug, Default)]
pub struct DoubleHashProber<H = StdHash> {
    secondary: H,
}

impl<H> DoubleHashProber<H> {
    #[must_use]
    #[inline]
    pub const fn new(secondary: H) -> Self {
        Self { secondary }
    }

    /// Returns the modulus used for tables of the given `capacity`.
    #[must_use]
    pub fn modulus_for(capacity: usize) -> usize {
        DOUBLE_HASH_MODULI
            .iter()
            .take_while(|m| **m < capacity)
            .last()
            .copied()
            .unwrap_or(DOUBLE_HASH_MODULI[0])
    }

    /// Returns the stride the sequence for `key` uses in a table of the given `capacity`.
    #[must_use]
    pub fn step_for<K: ?Sized>(&self, capacity: usize, key: &K) -> usize
    where
        H: KeyHash<K>,
    {
        let m = Self::modulus_for(capacity);
        m - self.secondary.hash_key(key) % m
    }
}

impl<K: ?Sized, H: KeyHash<K>> ProbeStrategy<K> for DoubleHashProber<H> {
    #[inline]
    fn init(&self, start: usize, capacity: usize, key: &K) -> ProbeState {
        ProbeState::new(start, capacity, self.step_for(capacity, key))
    }
}

#[cfg(test)]
mod probe_tests {
    use super::*;

    fn collect(state: &mut ProbeState) -> Vec<usize> {
        let mut slots = Vec::new();
        while let Probe::Slot(slot) = state.advance().unwrap() {
            slots.push(slot);
        }
        slots
    }

    #[test]
    fn test_linear_sequence_wraps() {
        let mut state = ProbeStrategy::<u32>::init(&LinearProber, 5, 7, &0);

        assert_eq!(collect(&mut state), vec![5, 6, 0, 1, 2, 3, 4]);
        assert!(state.is_exhausted());
        assert_eq!(state.taken(), 7);
    }

    #[test]
    fn test_linear_misuse_after_exhaustion() {
        let prober = LinearProber;
        let mut state = ProbeStrategy::<u32>::init(&prober, 0, 2, &0);

        let mut next = |state: &mut ProbeState| ProbeStrategy::<u32>::next(&prober, state);
        assert_eq!(next(&mut state), Ok(Probe::Slot(0)));
        assert_eq!(next(&mut state), Ok(Probe::Slot(1)));
        assert_eq!(next(&mut state), Ok(Probe::Exhausted));
        assert_eq!(next(&mut state), Err(TableError::ProberMisuse));
        assert_eq!(next(&mut state), Err(TableError::ProberMisuse));
    }

    #[test]
    fn test_zero_capacity_is_exhausted() {
        let mut state = ProbeState::new(3, 0, 1);
        assert_eq!(state.advance(), Ok(Probe::Exhausted));
        assert_eq!(state.advance(), Err(TableError::ProberMisuse));
    }

    #[test]
    fn test_double_hash_modulus_selection() {
        type P = DoubleHashProber;

        // Smaller than every modulus: first entry.
        assert_eq!(P::modulus_for(0), 7);
        assert_eq!(P::modulus_for(5), 7);
        assert_eq!(P::modulus_for(7), 7);

        // Strictly below the capacity.
        assert_eq!(P::modulus_for(8), 7);
        assert_eq!(P::modulus_for(11), 7);
        assert_eq!(P::modulus_for(19), 7);
        assert_eq!(P::modulus_for(20), 19);
        assert_eq!(P::modulus_for(23), 19);
        assert_eq!(P::modulus_for(47), 43);
        assert_eq!(P::modulus_for(1685759167), 1685759113);
        assert_eq!(P::modulus_for(usize::MAX), 1685759113);
    }

    #[test]
    fn test_double_hash_step() {
        let prober = DoubleHashProber::new(|k: &usize| *k);

        // m = 7 for capacity 11: step = 7 - h2 % 7.
        assert_eq!(prober.step_for(11, &0usize), 7);
        assert_eq!(prober.step_for(11, &3usize), 4);
        assert_eq!(prober.step_for(11, &6usize), 1);
        assert_eq!(prober.step_for(11, &7usize), 7);

        // m = 19 for capacity 23.
        assert_eq!(prober.step_for(23, &20usize), 18);
    }

    #[test]
    fn test_double_hash_sequence() {
        let prober = DoubleHashProber::new(|k: &usize| *k);

        // capacity 11, m = 7, h2 = 3 -> step 4.
        let mut state = ProbeStrategy::<usize>::init(&prober, 2, 11, &3);
        assert_eq!(state.step(), 4);
        assert_eq!(collect(&mut state), vec![2, 6, 10, 3, 7, 0, 4, 8, 1, 5, 9]);
        assert_eq!(
            ProbeStrategy::<usize>::next(&prober, &mut state),
            Err(TableError::ProberMisuse)
        );
    }

    #[test]
    fn test_double_hash_covers_prime_table() {
        let prober = DoubleHashProber::new(|k: &usize| k.wrapping_mul(2654435761));

        for key in 0..50usize {
            let mut state = ProbeStrategy::<usize>::init(&prober, key % 23, 23, &key);
            let mut slots = collect(&mut state);
            slots.sort_unstable();
            assert_eq!(slots, (0..23).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_probe_determinism() {
        let prober = DoubleHashProber::<StdHash>::default();

        let mut a = ProbeStrategy::<str>::init(&prober, 9, 47, "key");
        let mut b = ProbeStrategy::<str>::init(&prober, 9, 47, "key");
        assert_eq!(a, b);
        assert_eq!(collect(&mut a), collect(&mut b));
    }

    #[test]
    fn test_mul_mod_large() {
        assert_eq!(mul_mod(usize::MAX, 2, 7), ((usize::MAX as u128 * 2) % 7) as usize);
        assert_eq!(mul_mod(6, 4, 11), 2);
    }
}
