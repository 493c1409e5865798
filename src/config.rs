//! Construction parameters for [`IntValueMap`](crate::IntValueMap).

use crate::error::MapError;
use crate::int_table::Capacity;

/// Smallest number of slots a table ever has.
pub const MIN_CAPACITY: usize = 8;

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.65;

/// Missing value used by [`MapConfig::default`].
pub const DEFAULT_MISSING_VALUE: i32 = -1;

/// Construction parameters for an [`IntValueMap`](crate::IntValueMap).
///
/// # Examples
///
/// ```rust
/// use int_value_map::MapConfig;
///
/// let config = MapConfig::new(i32::MIN)
///     .with_initial_capacity(100)
///     .with_load_factor(0.5);
/// assert_eq!(config.validate(), Ok(()));
/// assert_eq!(config.capacity(), 128);
/// assert_eq!(config.resize_threshold(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Capacity hint. Values below [`MIN_CAPACITY`] (including `0`) are
    /// raised to it; anything else is rounded up to a power of two.
    pub initial_capacity: usize,
    /// Fraction of slots that may be occupied before the table doubles.
    /// Must lie in the open interval (0, 1).
    pub load_factor: f32,
    /// Value returned by the primitive lookups to signal absence. It can
    /// never be stored.
    pub missing_value: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_VALUE)
    }
}

impl MapConfig {
    /// Default capacity and load factor with the given missing value.
    pub const fn new(missing_value: i32) -> Self {
        MapConfig {
            initial_capacity: MIN_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            missing_value,
        }
    }

    /// Sets the capacity hint.
    pub const fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the load factor.
    pub const fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Checks the load factor.
    pub fn validate(&self) -> Result<(), MapError> {
        // Written so that NaN fails too.
        if self.load_factor > 0.0 && self.load_factor < 1.0 {
            Ok(())
        } else {
            Err(MapError::InvalidLoadFactor {
                load_factor: self.load_factor,
            })
        }
    }

    /// The slot count a table built from this config starts with.
    pub fn capacity(&self) -> usize {
        Capacity::from(self.initial_capacity).slots()
    }

    /// The resize threshold a table built from this config starts with.
    pub fn resize_threshold(&self) -> usize {
        (self.capacity() as f64 * f64::from(self.load_factor)) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MapConfig::default();
        assert_eq!(config.capacity(), MIN_CAPACITY);
        assert_eq!(config.load_factor, DEFAULT_LOAD_FACTOR);
        assert_eq!(config.missing_value, DEFAULT_MISSING_VALUE);
        assert_eq!(config.resize_threshold(), 5);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn small_capacities_clamp_to_minimum() {
        for requested in [0, 1, 5, MIN_CAPACITY] {
            let config = MapConfig::default().with_initial_capacity(requested);
            assert_eq!(config.capacity(), MIN_CAPACITY);
        }
        assert_eq!(
            MapConfig::default().with_initial_capacity(9).capacity(),
            16
        );
    }

    #[test]
    fn rejects_load_factors_outside_unit_interval() {
        for load_factor in [0.0, -0.5, 1.0, 1.5, f32::NAN] {
            let config = MapConfig::default().with_load_factor(load_factor);
            assert!(matches!(
                config.validate(),
                Err(MapError::InvalidLoadFactor { .. })
            ));
        }
        assert_eq!(
            MapConfig::default().with_load_factor(0.99).validate(),
            Ok(())
        );
    }
}
