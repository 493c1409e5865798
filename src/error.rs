use core::fmt;

/// Errors reported by [`IntValueMap`](crate::IntValueMap) operations.
///
/// Every error is reported at the call that caused it; the map is left
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapError {
    /// The value passed in equals the map's missing value, which is reserved
    /// to signal absence and can never be stored.
    MissingValueInsert {
        /// The rejected value.
        value: i32,
    },
    /// The load factor is not in the open interval (0, 1).
    InvalidLoadFactor {
        /// The rejected load factor.
        load_factor: f32,
    },
    /// A cursor operation needs a current entry, but the cursor has not
    /// returned one yet, is exhausted, or the entry was already removed.
    NoCurrentEntry,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::MissingValueInsert { value } => {
                write!(f, "cannot store the missing value {value}")
            }
            MapError::InvalidLoadFactor { load_factor } => {
                write!(f, "load factor {load_factor} is outside (0, 1)")
            }
            MapError::NoCurrentEntry => {
                write!(f, "cursor is not positioned on an entry")
            }
        }
    }
}

impl core::error::Error for MapError {}
