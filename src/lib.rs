//! An open-addressing hash table with pluggable probing.
//!
//! Entries are stored directly in a slot array sized by a fixed capacity ladder. Collisions are
//! resolved by a [`ProbeStrategy`], either [`LinearProber`] or [`DoubleHashProber`]. Removal
//! leaves tombstones that are cleaned up when the table grows, and growth is triggered before
//! an insert would bring `used / capacity` to the configured maximum load factor.

mod config;
mod error;
mod hash;
mod probe;
mod slot;
mod table;
#[macro_use]
mod builder;

// Public exports.
pub use builder::TableBuilder;
pub use config::{TableConfig, CAPACITY_LADDER, DEFAULT_MAX_LOAD_FACTOR};
pub use error::TableError;
pub use hash::{KeyEq, KeyHash, RadixStringHash, StdEq, StdHash};
pub use probe::{
    DoubleHashProber, LinearProber, Probe, ProbeState, ProbeStrategy, DOUBLE_HASH_MODULI,
};
pub use table::HashTable;
