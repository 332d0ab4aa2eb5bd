use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// The default capacity ladder. Each rung is roughly double the previous one.
pub const CAPACITY_LADDER: [usize; 28] = [
    11, 23, 47, 97, 197, 397, 797, 1597, 3203, 6421, 12853, 25717, 51437, 102877, 205759, 411527,
    823117, 1646237, 3292489, 6584983, 13169977, 26339969, 52679969, 105359969, 210719881,
    421439783, 842879579, 1685759167,
];

/// The default maximum load factor.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.4;

/// Sizing parameters of a [`HashTable`](crate::HashTable), fixed for the table's lifetime.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableConfig {
    /// Ascending table sizes the table grows through.
    pub ladder: Cow<'static, [usize]>,
    /// The rung the table starts on.
    pub capacity_index: usize,
    /// Growth is triggered when `(used + 1) / capacity` would reach this value.
    pub max_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            ladder: Cow::Borrowed(&CAPACITY_LADDER),
            capacity_index: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    /// Checks the parameters.
    ///
    /// The ladder must be non-empty, free of zeros, and strictly ascending. The capacity index
    /// must point into the ladder, and the load factor must lie in `(0, 1]`.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.ladder.is_empty() {
            return Err(TableError::InvalidConfig("capacity ladder is empty".into()));
        }

        if self.ladder[0] == 0 {
            return Err(TableError::InvalidConfig(
                "capacity ladder contains a zero rung".into(),
            ));
        }

        if let Some(pair) = self.ladder.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(TableError::InvalidConfig(format!(
                "capacity ladder is not strictly ascending at {} -> {}",
                pair[0], pair[1]
            )));
        }

        if self.capacity_index >= self.ladder.len() {
            return Err(TableError::InvalidConfig(format!(
                "capacity index {} is outside a ladder of {} rungs",
                self.capacity_index,
                self.ladder.len()
            )));
        }

        // NaN fails both comparisons.
        if !(self.max_load_factor > 0.0 && self.max_load_factor <= 1.0) {
            return Err(TableError::InvalidConfig(format!(
                "max load factor {} is outside (0, 1]",
                self.max_load_factor
            )));
        }

        Ok(())
    }

    /// Returns the capacity of the rung at the configured index.
    ///
    /// # Panics
    ///
    /// Panics if the configuration has not been validated and the index is out of range.
    #[inline]
    pub fn initial_capacity(&self) -> usize {
        self.ladder[self.capacity_index]
    }
}
