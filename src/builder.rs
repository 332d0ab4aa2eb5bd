use std::borrow::Cow;

use crate::config::TableConfig;
use crate::error::TableError;
use crate::hash::{StdEq, StdHash};
use crate::probe::{DoubleHashProber, LinearProber};
use crate::table::HashTable;

/// Collects the construction parameters of a [`HashTable`].
///
/// Sizing is validated by [`TableBuilder::build`]; strategies are swapped in by type.
///
/// # Examples
///
/// ```
/// use probemap::TableBuilder;
///
/// let mut table = TableBuilder::new()
///     .ladder(vec![7, 17, 37])
///     .max_load_factor(0.5)
///     .double_hash(|k: &u64| (*k >> 3) as usize)
///     .hasher(|k: &u64| *k as usize)
///     .build()?;
///
/// table.insert(3u64, "three")?;
///
/// assert_eq!(table.capacity(), 7);
/// assert_eq!(table.find(&3), Some(&"three"));
/// # Ok::<(), probemap::TableError>(())
/// ```
#[derive(Clone, Debug)]
pub struct TableBuilder<P = LinearProber, H = StdHash, E = StdEq> {
    config: TableConfig,
    prober: P,
    hasher: H,
    key_eq: E,
}

impl TableBuilder {
    /// Returns a builder with the default configuration, linear probing and std hashing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TableConfig::default(),
            prober: LinearProber,
            hasher: StdHash,
            key_eq: StdEq,
        }
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, H, E> TableBuilder<P, H, E> {
    /// Replaces the whole sizing configuration.
    #[must_use]
    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the capacity ladder. The table starts on the rung given by
    /// [`TableBuilder::capacity_index`].
    #[must_use]
    pub fn ladder(mut self, ladder: impl Into<Cow<'static, [usize]>>) -> Self {
        self.config.ladder = ladder.into();
        self
    }

    #[must_use]
    pub fn capacity_index(mut self, index: usize) -> Self {
        self.config.capacity_index = index;
        self
    }

    #[must_use]
    pub fn max_load_factor(mut self, alpha: f64) -> Self {
        self.config.max_load_factor = alpha;
        self
    }

    /// Sets the probe strategy.
    #[must_use]
    pub fn prober<Q>(self, prober: Q) -> TableBuilder<Q, H, E> {
        TableBuilder {
            config: self.config,
            prober,
            hasher: self.hasher,
            key_eq: self.key_eq,
        }
    }

    /// Switches to double hashing, with `secondary` deriving the step of each key.
    #[must_use]
    pub fn double_hash<S>(self, secondary: S) -> TableBuilder<DoubleHashProber<S>, H, E> {
        self.prober(DoubleHashProber::new(secondary))
    }

    /// Sets the primary hash, which picks the start of each probe sequence.
    #[must_use]
    pub fn hasher<G>(self, hasher: G) -> TableBuilder<P, G, E> {
        TableBuilder {
            config: self.config,
            prober: self.prober,
            hasher,
            key_eq: self.key_eq,
        }
    }

    /// Sets the key equality predicate.
    #[must_use]
    pub fn key_eq<F>(self, key_eq: F) -> TableBuilder<P, H, F> {
        TableBuilder {
            config: self.config,
            prober: self.prober,
            hasher: self.hasher,
            key_eq,
        }
    }

    /// Validates the configuration and builds an empty table.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidConfig`] if the configuration is rejected.
    pub fn build<K, V>(self) -> Result<HashTable<K, V, P, H, E>, TableError> {
        HashTable::with_parts(self.config, self.prober, self.hasher, self.key_eq)
    }
}

/// Builds a default [`HashTable`](crate::HashTable) from a list of key-value pairs.
///
/// The macro evaluates to `Result<HashTable<_, _>, TableError>`, since every insert can fail.
///
/// # Examples
///
/// This example creates a table with the default configuration.
///
/// ```
/// use probemap::table;
///
/// let table = table! {
///     "one": 1,
///     "two": 2,
///     "three": 3,
/// }?;
///
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.find(&"two"), Some(&2));
/// # Ok::<(), probemap::TableError>(())
/// ```
///
/// This example passes a configuration first.
///
/// ```
/// use probemap::{table, TableConfig};
///
/// let config = TableConfig {
///     capacity_index: 1,
///     ..TableConfig::default()
/// };
///
/// let table = table! {
///     config;
///     1: 'a',
///     2: 'b',
/// }?;
///
/// assert_eq!(table.capacity(), 23);
/// assert_eq!(table.find(&1), Some(&'a'));
/// # Ok::<(), probemap::TableError>(())
/// ```
#[macro_export]
macro_rules! table {
    // Pattern without configuration.
    ( $( $key:tt : $value:expr ),* $(,)? ) => {
        (|| -> ::core::result::Result<_, $crate::TableError> {
            #[allow(unused_mut)]
            let mut table = $crate::HashTable::new();
            $(
                table.insert($key, $value)?;
            )*
            Ok(table)
        })()
    };
    // Pattern with a configuration.
    ( $config:expr; $( $key:tt : $value:expr ),* $(,)? ) => {
        (|| -> ::core::result::Result<_, $crate::TableError> {
            #[allow(unused_mut)]
            let mut table = $crate::HashTable::with_config($config)?;
            $(
                table.insert($key, $value)?;
            )*
            Ok(table)
        })()
    };
    // Catch-all pattern for invalid patterns.
    ( $($tt:tt)* ) => {
        compile_error!("Invalid syntax. Use `table! { key: value, ... }` or `table! { config; key: value, ... }`.");
    };
}
