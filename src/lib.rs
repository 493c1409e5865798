#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;

/// The error type returned by fallible map operations.
pub mod error;

pub mod int_table;

/// A hash map from arbitrary keys to unboxed `i32` values.
///
/// This module provides [`IntValueMap`], which wraps an
/// [`IntTable`](int_table::IntTable) and adds hashing, the missing-value
/// convention, iteration views and the usual map conveniences.
pub mod int_value_map;

pub use config::DEFAULT_LOAD_FACTOR;
pub use config::DEFAULT_MISSING_VALUE;
pub use config::MIN_CAPACITY;
pub use config::MapConfig;
pub use error::MapError;
pub use int_table::IntTable;
pub use int_value_map::Cursor;
pub use int_value_map::EntryMut;
pub use int_value_map::IntValueMap;

/// The hasher builder used when none is supplied.
pub type DefaultHashBuilder = foldhash::fast::RandomState;
