use thiserror::Error;

/// Errors reported by [`HashTable`](crate::HashTable) and the probing strategies.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TableError {
    /// The requested key has no live entry in the table.
    #[error("key not found")]
    KeyNotFound,

    /// Growth was requested while the table already sits on the last rung of its capacity
    /// ladder.
    #[error("capacity ladder exhausted at capacity {capacity}")]
    CapacityExhausted { capacity: usize },

    /// `next` was called on a probe sequence that has already reported exhaustion.
    #[error("probe sequence used after it was exhausted")]
    ProberMisuse,

    /// An insert walked the whole probe sequence without finding a free slot.
    ///
    /// The load factor check makes this unreachable for a consistent table.
    #[error("no free slot reachable in a table of capacity {capacity}")]
    TableFull { capacity: usize },

    /// The construction parameters were rejected.
    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),
}

impl TableError {
    /// Returns `true` for errors a caller can recover from without rebuilding the table.
    #[inline(always)]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, TableError::KeyNotFound)
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(TableError::KeyNotFound.to_string(), "key not found");
        assert_eq!(
            TableError::CapacityExhausted { capacity: 17 }.to_string(),
            "capacity ladder exhausted at capacity 17"
        );
        assert_eq!(
            TableError::InvalidConfig("empty ladder".into()).to_string(),
            "invalid table configuration: empty ladder"
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(TableError::KeyNotFound.is_recoverable());
        assert!(!TableError::ProberMisuse.is_recoverable());
        assert!(!TableError::TableFull { capacity: 11 }.is_recoverable());
        assert!(!TableError::CapacityExhausted { capacity: 11 }.is_recoverable());
    }
}
