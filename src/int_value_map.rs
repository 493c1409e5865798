use core::borrow::Borrow;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;
use core::iter::FusedIterator;
use core::ops::Index;

use foldhash::fast::FixedState;

use crate::DefaultHashBuilder;
use crate::config::DEFAULT_MISSING_VALUE;
use crate::config::MapConfig;
use crate::error::MapError;
use crate::int_table;
use crate::int_table::Entry as TableEntry;
use crate::int_table::IntTable;
use crate::int_table::RawCursor;

/// Seed of the fixed hasher behind [`IntValueMap::hash_code`]. Independent
/// of any map's own hasher so that equal maps hash equally.
const ENTRY_HASH_SEED: u64 = 0x2545_f491_4f6c_dd1d;

#[inline]
fn make_hasher<K, S>(hash_builder: &S) -> impl Fn(&K) -> u64 + '_
where
    K: Hash,
    S: BuildHasher,
{
    move |key: &K| hash_builder.hash_one(key)
}

/// A hash map from keys to `i32` values that stores values unboxed in a
/// flat slot array.
///
/// `IntValueMap<K, S>` uses open addressing with linear probing over two
/// parallel arrays (keys and values), so lookups and inserts never allocate
/// per entry. Removal uses backward-shift deletion instead of tombstones.
///
/// Each map is configured with a *missing value*: an `i32` that can never be
/// stored, returned by the primitive accessors ([`get_value`],
/// [`remove_key`], [`put_value`]) to signal absence. The [`get`], [`remove`]
/// and [`put`] family report absence with `None` instead, whatever the
/// missing value is.
///
/// Iteration follows slot order, not insertion order.
///
/// Keys must uphold the usual `Hash`/`Eq` contract: equal keys hash
/// equally. A key type that breaks it makes lookups unreliable.
///
/// # Performance Characteristics
///
/// - **Memory**: `size_of::<Option<K>>() + 4` bytes per slot; slots are at
///   most `load_factor` full.
/// - **Lookups**: amortized O(1); [`contains_value`] scans every slot.
///
/// [`get_value`]: IntValueMap::get_value
/// [`remove_key`]: IntValueMap::remove_key
/// [`put_value`]: IntValueMap::put_value
/// [`get`]: IntValueMap::get
/// [`remove`]: IntValueMap::remove
/// [`put`]: IntValueMap::put
/// [`contains_value`]: IntValueMap::contains_value
#[derive(Clone)]
pub struct IntValueMap<K, S = DefaultHashBuilder> {
    table: IntTable<K>,
    hash_builder: S,
    missing_value: i32,
}

impl<K> IntValueMap<K, DefaultHashBuilder> {
    /// Creates an empty map with the default capacity and load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let map: IntValueMap<String> = IntValueMap::new(-1);
    /// assert!(map.is_empty());
    /// assert_eq!(map.missing_value(), -1);
    /// ```
    pub fn new(missing_value: i32) -> Self {
        Self::with_hasher(missing_value, DefaultHashBuilder::default())
    }

    /// Creates an empty map with the given capacity hint and load factor.
    ///
    /// The capacity is rounded up to a power of two no smaller than
    /// [`MIN_CAPACITY`](crate::MIN_CAPACITY).
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLoadFactor`] unless `0 < load_factor < 1`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let map: IntValueMap<u64> = IntValueMap::with_capacity(100, 0.5, -1)?;
    /// assert_eq!(map.capacity(), 128);
    /// assert_eq!(map.resize_threshold(), 64);
    ///
    /// assert!(IntValueMap::<u64>::with_capacity(100, 1.0, -1).is_err());
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    pub fn with_capacity(
        initial_capacity: usize,
        load_factor: f32,
        missing_value: i32,
    ) -> Result<Self, MapError> {
        Self::with_config(
            MapConfig::new(missing_value)
                .with_initial_capacity(initial_capacity)
                .with_load_factor(load_factor),
        )
    }

    /// Creates an empty map from a [`MapConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLoadFactor`] if the config's load factor
    /// is outside (0, 1).
    pub fn with_config(config: MapConfig) -> Result<Self, MapError> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, S> Default for IntValueMap<K, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(DEFAULT_MISSING_VALUE, S::default())
    }
}

impl<K, S> IntValueMap<K, S> {
    /// Creates an empty map with the default capacity and load factor,
    /// hashing keys with `hash_builder`.
    pub fn with_hasher(missing_value: i32, hash_builder: S) -> Self {
        let config = MapConfig::new(missing_value);
        IntValueMap {
            table: IntTable::with_capacity(config.initial_capacity, config.load_factor),
            hash_builder,
            missing_value,
        }
    }

    /// Creates an empty map from a [`MapConfig`], hashing keys with
    /// `hash_builder`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLoadFactor`] if the config's load factor
    /// is outside (0, 1).
    pub fn with_config_and_hasher(config: MapConfig, hash_builder: S) -> Result<Self, MapError> {
        config.validate()?;
        Ok(IntValueMap {
            table: IntTable::with_capacity(config.initial_capacity, config.load_factor),
            hash_builder,
            missing_value: config.missing_value,
        })
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the load factor the map was built with.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the number of entries above which the next insert doubles
    /// the capacity.
    pub fn resize_threshold(&self) -> usize {
        self.table.resize_threshold()
    }

    /// Returns the value that signals absence and can never be stored.
    pub fn missing_value(&self) -> i32 {
        self.missing_value
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all entries. Capacity and load factor are kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut map = IntValueMap::new(-1);
    /// map.put("a", 1)?;
    /// let capacity = map.capacity();
    ///
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), capacity);
    /// assert_eq!(map.get_value("a"), -1);
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns `true` if some key maps to `value`.
    ///
    /// This scans every slot. The missing value is never contained.
    pub fn contains_value(&self, value: i32) -> bool {
        value != self.missing_value && self.table.contains_value(value)
    }

    /// Returns an iterator over `(&K, i32)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys in slot order.
    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values in slot order.
    ///
    /// Besides `Iterator`, [`Values::next_int`] offers an `Option`-free
    /// step that returns the missing value once the values run out.
    pub fn values(&self) -> Values<'_, K> {
        Values {
            inner: self.table.iter(),
            missing_value: self.missing_value,
        }
    }

    /// Returns an iterator of [`EntryMut`] views, which can replace values in
    /// place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut map = IntValueMap::new(-1);
    /// map.put("seven", 7)?;
    /// map.put("eight", 8)?;
    ///
    /// for mut entry in map.iter_mut() {
    ///     if *entry.key() == "seven" {
    ///         entry.set_value(100)?;
    ///     }
    /// }
    /// assert_eq!(map.get_value("seven"), 100);
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K> {
        IterMut {
            inner: self.table.iter_mut(),
            missing_value: self.missing_value,
        }
    }

    /// Removes every entry, yielding them as owned pairs.
    pub fn drain(&mut self) -> Drain<'_, K> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns a cursor over the entries that can update or remove the entry
    /// it is positioned on.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut map = IntValueMap::new(-1);
    /// for i in 0..10 {
    ///     map.put(i, i)?;
    /// }
    ///
    /// let mut cursor = map.cursor();
    /// while let Some(key) = cursor.next_key() {
    ///     if key % 2 == 0 {
    ///         cursor.remove()?;
    ///     }
    /// }
    /// assert_eq!(map.len(), 5);
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, K, S> {
        Cursor {
            raw: RawCursor::new(&self.table),
            table: &mut self.table,
            hash_builder: &self.hash_builder,
            missing_value: self.missing_value,
        }
    }
}

impl<K, S> IntValueMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn check_value(&self, value: i32) -> Result<(), MapError> {
        if value == self.missing_value {
            return Err(MapError::MissingValueInsert { value });
        }
        Ok(())
    }

    /// Inserts a key-value pair.
    ///
    /// Returns `Ok(None)` if the key was new and `Ok(Some(old))` if an
    /// existing value was replaced. Inserting a new key that takes the
    /// population over [`resize_threshold`](Self::resize_threshold) doubles
    /// the capacity.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingValueInsert`] if `value` equals the missing
    /// value. The map is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    /// use int_value_map::MapError;
    ///
    /// let mut map = IntValueMap::new(-1);
    /// assert_eq!(map.put("seven", 7), Ok(None));
    /// assert_eq!(map.put("seven", 8), Ok(Some(7)));
    /// assert_eq!(map.put("six", -1), Err(MapError::MissingValueInsert { value: -1 }));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn put(&mut self, key: K, value: i32) -> Result<Option<i32>, MapError> {
        self.check_value(value)?;

        let hash = self.hash_builder.hash_one(&key);
        match self
            .table
            .entry(hash, |k| k == &key, make_hasher::<K, S>(&self.hash_builder))
        {
            TableEntry::Occupied(mut entry) => Ok(Some(entry.insert(value))),
            TableEntry::Vacant(entry) => {
                entry.insert(key, value);
                Ok(None)
            }
        }
    }

    /// Inserts a key-value pair, returning the previous value or the missing
    /// value if the key was new.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingValueInsert`] if `value` equals the missing
    /// value.
    pub fn put_value(&mut self, key: K, value: i32) -> Result<i32, MapError> {
        let missing_value = self.missing_value;
        Ok(self.put(key, value)?.unwrap_or(missing_value))
    }

    /// Returns the value for `key`, or the missing value if absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut map = IntValueMap::new(i32::MIN);
    /// map.put(String::from("a"), 1)?;
    /// assert_eq!(map.get_value("a"), 1);
    /// assert_eq!(map.get_value("b"), i32::MIN);
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    #[inline]
    pub fn get_value<Q>(&self, key: &Q) -> i32
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).unwrap_or(self.missing_value)
    }

    /// Returns the value for `key`, or `None` if absent.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<i32>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.get(hash, |k| k.borrow() == key)
    }

    /// Returns the value for `key`, or `default` if absent.
    pub fn get_or_default<Q>(&self, key: &Q, default: i32) -> i32
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, i32)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |k| k.borrow() == key)
            .map(|(k, v)| (k, *v))
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_index(hash, |k| k.borrow() == key).is_some()
    }

    /// Removes `key`, returning its value or the missing value if absent.
    pub fn remove_key<Q>(&mut self, key: &Q) -> i32
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove(key).unwrap_or(self.missing_value)
    }

    /// Removes `key`, returning its value or `None` if absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut map = IntValueMap::new(-1);
    /// map.put(1u64, 10)?;
    /// assert_eq!(map.remove(&1), Some(10));
    /// assert_eq!(map.remove(&1), None);
    /// assert_eq!(map.remove_key(&1), -1);
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<i32>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key`, returning the stored key and its value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, i32)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(
            hash,
            |k| k.borrow() == key,
            make_hasher::<K, S>(&self.hash_builder),
        )
    }

    /// Replaces the value of an existing key, returning the old value.
    /// Absent keys are not inserted.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingValueInsert`] if `value` equals the missing
    /// value.
    pub fn replace<Q>(&mut self, key: &Q, value: i32) -> Result<Option<i32>, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.check_value(value)?;

        let hash = self.hash_builder.hash_one(key);
        Ok(self
            .table
            .get_mut(hash, |k| k.borrow() == key)
            .map(|slot| core::mem::replace(slot, value)))
    }

    /// Returns the value for `key`, computing and inserting it with `f` if
    /// absent.
    ///
    /// If `f` returns the missing value nothing is inserted and the missing
    /// value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut map = IntValueMap::new(-1);
    /// assert_eq!(map.compute_if_absent("abc", |k| k.len() as i32), 3);
    /// assert_eq!(map.compute_if_absent("abc", |_| 99), 3);
    /// assert_eq!(map.compute_if_absent("xyz", |_| -1), -1);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn compute_if_absent(&mut self, key: K, f: impl FnOnce(&K) -> i32) -> i32 {
        let missing_value = self.missing_value;
        let hash = self.hash_builder.hash_one(&key);
        match self
            .table
            .entry(hash, |k| k == &key, make_hasher::<K, S>(&self.hash_builder))
        {
            TableEntry::Occupied(entry) => entry.get(),
            TableEntry::Vacant(entry) => {
                let value = f(&key);
                if value != missing_value {
                    entry.insert(key, value);
                }
                value
            }
        }
    }

    /// Recomputes the value of an existing key with `f`, returning the new
    /// value, or the missing value if the key is absent.
    ///
    /// If `f` returns the missing value the entry is removed.
    pub fn compute_if_present<Q>(&mut self, key: &Q, f: impl FnOnce(&K, i32) -> i32) -> i32
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let missing_value = self.missing_value;
        let hash = self.hash_builder.hash_one(key);
        match self.table.entry(
            hash,
            |k| k.borrow() == key,
            make_hasher::<K, S>(&self.hash_builder),
        ) {
            TableEntry::Occupied(mut entry) => {
                let value = f(entry.key(), entry.get());
                if value == missing_value {
                    entry.remove();
                } else {
                    entry.insert(value);
                }
                value
            }
            TableEntry::Vacant(_) => missing_value,
        }
    }

    /// Inserts `value` if `key` is absent, otherwise stores `f(old, value)`.
    /// Returns the value now associated with the key.
    ///
    /// If `f` returns the missing value the entry is removed and the missing
    /// value is returned.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingValueInsert`] if `value` equals the missing
    /// value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut counts = IntValueMap::new(-1);
    /// for word in ["a", "b", "a"] {
    ///     counts.merge(word, 1, |old, new| old + new)?;
    /// }
    /// assert_eq!(counts.get_value("a"), 2);
    /// assert_eq!(counts.get_value("b"), 1);
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    pub fn merge(
        &mut self,
        key: K,
        value: i32,
        f: impl FnOnce(i32, i32) -> i32,
    ) -> Result<i32, MapError> {
        self.check_value(value)?;

        let missing_value = self.missing_value;
        let hash = self.hash_builder.hash_one(&key);
        match self
            .table
            .entry(hash, |k| k == &key, make_hasher::<K, S>(&self.hash_builder))
        {
            TableEntry::Occupied(mut entry) => {
                let merged = f(entry.get(), value);
                if merged == missing_value {
                    entry.remove();
                } else {
                    entry.insert(merged);
                }
                Ok(merged)
            }
            TableEntry::Vacant(entry) => {
                entry.insert(key, value);
                Ok(value)
            }
        }
    }

    /// Copies every entry of `other` into this map.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingValueInsert`] at the first value of
    /// `other` that equals this map's missing value; entries copied before
    /// it stay inserted.
    pub fn put_all<S2>(&mut self, other: &IntValueMap<K, S2>) -> Result<(), MapError>
    where
        K: Clone,
    {
        for (key, value) in other {
            self.put(key.clone(), value)?;
        }
        Ok(())
    }

    /// Shrinks the capacity to the smallest power of two that holds the
    /// current entries within the load factor.
    ///
    /// Compaction is never triggered implicitly; call it after bulk
    /// removals to release memory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut map = IntValueMap::new(-1);
    /// for i in 0..50 {
    ///     map.put(i, i)?;
    /// }
    /// for i in 0..46 {
    ///     map.remove(&i);
    /// }
    ///
    /// let before = map.capacity();
    /// map.compact();
    /// assert!(map.capacity() < before);
    /// assert_eq!(map.get(&49), Some(49));
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    pub fn compact(&mut self) {
        self.table.compact(make_hasher::<K, S>(&self.hash_builder));
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&K, i32) -> bool) {
        let mut cursor = self.cursor();
        while let Some((key, value)) = cursor.next_entry() {
            if !f(key, value) && cursor.remove().is_err() {
                unreachable!("cursor is positioned on the entry it just returned");
            }
        }
    }

    /// Computes a histogram of probe distances.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> int_table::ProbeHistogram {
        self.table.probe_histogram(make_hasher::<K, S>(&self.hash_builder))
    }

    /// Collects occupancy and memory statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> int_table::DebugStats {
        self.table.debug_stats(make_hasher::<K, S>(&self.hash_builder))
    }
}

impl<K, S> IntValueMap<K, S>
where
    K: Hash,
{
    /// Order-independent hash of the map's contents.
    ///
    /// The wrapping sum of one contribution per entry, combining the key's
    /// hash and the value. Keys are hashed with a fixed-seed hasher rather
    /// than the map's own, so maps that compare equal produce the same hash
    /// code even when their hashers are seeded differently.
    pub fn hash_code(&self) -> u64 {
        let state = FixedState::with_seed(ENTRY_HASH_SEED);
        self.iter().fold(0u64, |sum, (key, value)| {
            sum.wrapping_add(state.hash_one(key) ^ u64::from(value as u32))
        })
    }
}

impl<K, S> Debug for IntValueMap<K, S>
where
    K: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, S> Display for IntValueMap<K, S>
where
    K: Display,
{
    /// Renders the entries in slot order as `{k1=v1, k2=v2}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

impl<K, S> PartialEq for IntValueMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Maps are equal when they hold the same key-value pairs. Capacity,
    /// load factor and missing value do not take part.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, S> Eq for IntValueMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
}

impl<K, S> Hash for IntValueMap<K, S>
where
    K: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K, Q, S> Index<&Q> for IntValueMap<K, S>
where
    K: Borrow<Q> + Hash + Eq,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = i32;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &i32 {
        let hash = self.hash_builder.hash_one(key);
        match self.table.find(hash, |k| k.borrow() == key) {
            Some((_, value)) => value,
            None => panic!("key not found"),
        }
    }
}

impl<K, S> Extend<(K, i32)> for IntValueMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// # Panics
    ///
    /// Panics if an item carries the missing value.
    fn extend<T: IntoIterator<Item = (K, i32)>>(&mut self, iter: T) {
        for (key, value) in iter {
            if let Err(err) = self.put(key, value) {
                panic!("{err}");
            }
        }
    }
}

impl<'a, K, S> IntoIterator for &'a IntValueMap<K, S> {
    type Item = (&'a K, i32);
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, S> IntoIterator for &'a mut IntValueMap<K, S> {
    type Item = EntryMut<'a, K>;
    type IntoIter = IterMut<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A mutable view of one entry, yielded by [`IntValueMap::iter_mut`].
///
/// Writing through the view goes straight to the value slot; the key is not
/// looked up again.
pub struct EntryMut<'a, K> {
    key: &'a K,
    value: &'a mut i32,
    missing_value: i32,
}

impl<K> EntryMut<'_, K> {
    /// Returns the entry's key.
    pub fn key(&self) -> &K {
        self.key
    }

    /// Returns the entry's value.
    pub fn value(&self) -> i32 {
        *self.value
    }

    /// Replaces the entry's value, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingValueInsert`] if `value` equals the missing
    /// value.
    pub fn set_value(&mut self, value: i32) -> Result<i32, MapError> {
        if value == self.missing_value {
            return Err(MapError::MissingValueInsert { value });
        }
        Ok(core::mem::replace(self.value, value))
    }
}

impl<K: Debug> Debug for EntryMut<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryMut")
            .field("key", self.key)
            .field("value", self.value)
            .finish()
    }
}

/// A cursor over the entries of an [`IntValueMap`] that can update or
/// remove the entry it is positioned on.
///
/// Created by [`IntValueMap::cursor`]. The cursor starts before the first
/// entry; [`next_key`](Self::next_key) or [`next_entry`](Self::next_entry)
/// moves it forward. Removing an entry may shift later entries of the same
/// probe chain backward; the cursor accounts for that, so every entry is
/// visited exactly once.
pub struct Cursor<'a, K, S> {
    table: &'a mut IntTable<K>,
    hash_builder: &'a S,
    missing_value: i32,
    raw: RawCursor,
}

impl<K, S> Cursor<'_, K, S> {
    /// Advances to the next entry and returns its key.
    pub fn next_key(&mut self) -> Option<&K> {
        let index = self.raw.advance(self.table)?;
        self.table.key_at(index)
    }

    /// Advances to the next entry and returns its key and value.
    pub fn next_entry(&mut self) -> Option<(&K, i32)> {
        let index = self.raw.advance(self.table)?;
        let value = self.table.value_at(index)?;
        self.table.key_at(index).map(|key| (key, value))
    }

    /// Returns the key of the current entry.
    pub fn key(&self) -> Option<&K> {
        self.table.key_at(self.raw.current()?)
    }

    /// Returns the value of the current entry.
    pub fn value(&self) -> Option<i32> {
        self.table.value_at(self.raw.current()?)
    }

    /// Replaces the value of the current entry in place, returning the
    /// previous value.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingValueInsert`] if `value` equals the missing
    /// value, and [`MapError::NoCurrentEntry`] if the cursor is not on an
    /// entry.
    pub fn set_value(&mut self, value: i32) -> Result<i32, MapError> {
        if value == self.missing_value {
            return Err(MapError::MissingValueInsert { value });
        }

        let index = self.raw.current().ok_or(MapError::NoCurrentEntry)?;
        self.table
            .replace_at(index, value)
            .ok_or(MapError::NoCurrentEntry)
    }
}

impl<K, S> Cursor<'_, K, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Removes the current entry, returning its key and value.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NoCurrentEntry`] before the first advance, after
    /// the cursor is exhausted, or when the current entry was already
    /// removed.
    pub fn remove(&mut self) -> Result<(K, i32), MapError> {
        self.raw
            .remove_current(self.table, make_hasher::<K, S>(self.hash_builder))
            .ok_or(MapError::NoCurrentEntry)
    }
}

/// An iterator over the entries of an [`IntValueMap`].
pub struct Iter<'a, K> {
    inner: int_table::Iter<'a, K>,
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a K, i32);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

/// An iterator over the keys of an [`IntValueMap`].
pub struct Keys<'a, K> {
    inner: int_table::Iter<'a, K>,
}

impl<K> Clone for Keys<'_, K> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Keys<'_, K> {}

impl<K> FusedIterator for Keys<'_, K> {}

/// An iterator over the values of an [`IntValueMap`].
pub struct Values<'a, K> {
    inner: int_table::Iter<'a, K>,
    missing_value: i32,
}

impl<K> Values<'_, K> {
    /// Returns the next value, or the missing value once exhausted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use int_value_map::IntValueMap;
    ///
    /// let mut map = IntValueMap::new(-1);
    /// map.put("a", 5)?;
    ///
    /// let mut values = map.values();
    /// let mut sum = 0;
    /// while values.len() > 0 {
    ///     sum += values.next_int();
    /// }
    /// assert_eq!(sum, 5);
    /// assert_eq!(values.next_int(), -1);
    /// # Ok::<(), int_value_map::MapError>(())
    /// ```
    #[inline]
    pub fn next_int(&mut self) -> i32 {
        match self.inner.next() {
            Some((_, value)) => value,
            None => self.missing_value,
        }
    }
}

impl<K> Clone for Values<'_, K> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
            missing_value: self.missing_value,
        }
    }
}

impl<K> Iterator for Values<'_, K> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Values<'_, K> {}

impl<K> FusedIterator for Values<'_, K> {}

/// An iterator of [`EntryMut`] views over an [`IntValueMap`].
pub struct IterMut<'a, K> {
    inner: int_table::IterMut<'a, K>,
    missing_value: i32,
}

impl<'a, K> Iterator for IterMut<'a, K> {
    type Item = EntryMut<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let missing_value = self.missing_value;
        self.inner.next().map(|(key, value)| EntryMut {
            key,
            value,
            missing_value,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for IterMut<'_, K> {}

impl<K> FusedIterator for IterMut<'_, K> {}

/// A draining iterator over the entries of an [`IntValueMap`].
pub struct Drain<'a, K> {
    inner: int_table::Drain<'a, K>,
}

impl<K> Iterator for Drain<'_, K> {
    type Item = (K, i32);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Drain<'_, K> {}

impl<K> FusedIterator for Drain<'_, K> {}
