use core::hash::{Hash, Hasher};

use std::collections::hash_map::DefaultHasher;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maps a key to a hash value. The table reduces it modulo its capacity to get a probe start.
///
/// Implemented for every `Fn(&K) -> usize`, so closures can be used directly.
pub trait KeyHash<K: ?Sized> {
    fn hash_key(&self, key: &K) -> usize;
}

impl<K, F> KeyHash<K> for F
where
    K: ?Sized,
    F: Fn(&K) -> usize,
{
    #[inline(always)]
    fn hash_key(&self, key: &K) -> usize {
        self(key)
    }
}

/// Decides whether two keys are the same key.
///
/// Implemented for every `Fn(&K, &K) -> bool`.
pub trait KeyEq<K: ?Sized> {
    fn keys_equal(&self, a: &K, b: &K) -> bool;
}

impl<K, F> KeyEq<K> for F
where
    K: ?Sized,
    F: Fn(&K, &K) -> bool,
{
    #[inline(always)]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}

/// Hashes keys through their [`Hash`] implementation.
///
/// The hasher is created with fixed keys, so the same key always hashes to the same value,
/// across tables and across runs of the same build.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdHash;

impl<K: Hash + ?Sized> KeyHash<K> for StdHash {
    #[inline]
    fn hash_key(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish() as usize
    }
}

/// Compares keys through their [`PartialEq`] implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdEq;

impl<K: PartialEq + ?Sized> KeyEq<K> for StdEq {
    #[inline(always)]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// A string digest over base-36 groups of characters.
///
/// The string is cut into up to five groups of six characters, aligned to its end, so the last
/// six characters form the last group. Each group is read as a base-36 number where `a..=z`
/// (case-insensitive) map to `0..=25` and `0..=9` map to `26..=35`. The digest is the weighted
/// sum of the groups with the five `r` values. Characters beyond the last thirty do not
/// contribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadixStringHash {
    r: [u64; 5],
}

impl RadixStringHash {
    const GROUPS: usize = 5;
    const GROUP_LEN: usize = 6;
    const PRESET: [u64; 5] = [983132572, 1468777056, 552714139, 984953261, 261934300];

    /// Returns a digest with the preset `r` values.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self { r: Self::PRESET }
    }

    /// Returns a digest with five random 32-bit `r` values.
    #[must_use]
    pub fn random() -> Self {
        Self::from_rng(&mut rand::rng())
    }

    /// Returns a digest with `r` values drawn from a generator seeded with `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(&mut StdRng::seed_from_u64(seed))
    }

    fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut r = [0; 5];
        for value in r.iter_mut() {
            *value = u64::from(rng.random::<u32>());
        }
        Self { r }
    }

    /// Returns the `r` values in use.
    #[inline(always)]
    pub const fn r_values(&self) -> [u64; 5] {
        self.r
    }

    #[inline(always)]
    const fn char_value(c: u8) -> u64 {
        match c {
            b'a'..=b'z' => (c - b'a') as u64,
            b'A'..=b'Z' => (c - b'A') as u64,
            b'0'..=b'9' => 26 + (c - b'0') as u64,
            _ => 0,
        }
    }

    /// Computes the digest of `s`.
    pub fn digest(&self, s: &str) -> u64 {
        let bytes = s.as_bytes();
        let mut w = [0u64; 5];

        for group in 0..Self::GROUPS {
            let Some(end) = bytes.len().checked_sub(group * Self::GROUP_LEN) else {
                break;
            };
            let start = end.saturating_sub(Self::GROUP_LEN);
            w[Self::GROUPS - 1 - group] = bytes[start..end]
                .iter()
                .fold(0u64, |acc, &c| acc * 36 + Self::char_value(c));
        }

        self.r
            .iter()
            .zip(w.iter())
            .fold(0u64, |h, (r, w)| h.wrapping_add(r.wrapping_mul(*w)))
    }
}

impl Default for RadixStringHash {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsRef<str> + ?Sized> KeyHash<K> for RadixStringHash {
    #[inline]
    fn hash_key(&self, key: &K) -> usize {
        self.digest(key.as_ref()) as usize
    }
}
