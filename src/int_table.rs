//! The raw open-addressing table backing [`IntValueMap`].
//!
//! `IntTable<K>` stores keys and `i32` values in two index-aligned slot
//! arrays whose length is always a power of two. Like a raw hash table it
//! never hashes anything itself: every operation takes the key's hash and an
//! equality predicate, and operations that move entries (removal, growth,
//! compaction) additionally take a `hasher` closure used to recompute the
//! ideal slot of the entries they relocate. Hashes are never cached.
//!
//! [`IntValueMap`]: crate::IntValueMap

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::iter::Zip;
use core::marker::PhantomData;
use core::slice;

use crate::config::MIN_CAPACITY;

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        #[inline(always)]
        fn fold(mixed: u64) -> usize {
            mixed as usize
        }
    } else {
        #[inline(always)]
        fn fold(mixed: u64) -> usize {
            (mixed ^ (mixed >> 32)) as usize
        }
    }
}

/// Mix a raw key hash before it is masked down to a slot index.
///
/// Hash functions that leave the low bits poorly distributed (identity
/// hashes of small integers being the classic case) would otherwise pile
/// entries into long clusters.
#[inline(always)]
pub(crate) fn spread(hash: u64) -> usize {
    let mut x = hash;
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    fold(x)
}

#[inline(always)]
fn resize_threshold(capacity: usize, load_factor: f32) -> usize {
    (capacity as f64 * f64::from(load_factor)) as usize
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

/// A resolved slot count: a power of two no smaller than [`MIN_CAPACITY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Capacity {
    slots: usize,
}

impl From<usize> for Capacity {
    #[inline]
    fn from(requested: usize) -> Self {
        let slots = requested
            .max(MIN_CAPACITY)
            .checked_next_power_of_two()
            .unwrap_or_else(|| capacity_overflow());
        Capacity { slots }
    }
}

impl Capacity {
    #[inline(always)]
    pub(crate) fn slots(self) -> usize {
        self.slots
    }

    fn doubled(self) -> Self {
        match self.slots.checked_mul(2) {
            Some(slots) => Capacity { slots },
            None => capacity_overflow(),
        }
    }
}

/// Allocate empty slot storage, checking the size before anything is
/// allocated so that a failed resize leaves the caller's storage untouched.
fn allocate<K>(capacity: Capacity) -> (Box<[Option<K>]>, Box<[i32]>) {
    let slots = capacity.slots();
    if Layout::array::<Option<K>>(slots).is_err() || Layout::array::<i32>(slots).is_err() {
        capacity_overflow();
    }

    let keys = (0..slots).map(|_| None).collect::<Vec<_>>().into_boxed_slice();
    let values = vec![0; slots].into_boxed_slice();
    (keys, values)
}

/// An open-addressing table of keys to `i32` values using linear probing
/// and backward-shift deletion.
///
/// The table has no notion of a "missing value"; that sentinel lives in
/// [`IntValueMap`](crate::IntValueMap). Lookups here answer with `Option`.
///
/// ## Example
///
/// ```rust
/// # use core::hash::BuildHasher;
/// #
/// # use foldhash::fast::FixedState;
/// # use int_value_map::int_table::Entry;
/// # use int_value_map::int_table::IntTable;
/// #
/// let state = FixedState::with_seed(7);
/// let hasher = |k: &&str| state.hash_one(k);
///
/// let mut table: IntTable<&str> = IntTable::with_capacity(16, 0.5);
/// match table.entry(hasher(&"seven"), |k| *k == "seven", hasher) {
///     Entry::Vacant(entry) => entry.insert("seven", 7),
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// assert_eq!(table.get(hasher(&"seven"), |k| *k == "seven"), Some(7));
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Clone)]
pub struct IntTable<K> {
    keys: Box<[Option<K>]>,
    values: Box<[i32]>,

    len: usize,
    resize_threshold: usize,
    load_factor: f32,
}

impl<K> Debug for IntTable<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::string::String;

        f.debug_struct("IntTable")
            .field("populated", &self.len)
            .field("capacity", &self.capacity())
            .field("resize_threshold", &self.resize_threshold)
            .field("load_factor", &self.load_factor)
            .field(
                "slots",
                &self
                    .keys
                    .chunks(16)
                    .map(|row| {
                        row.iter()
                            .map(|k| if k.is_some() { '#' } else { '.' })
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<K> IntTable<K> {
    /// Creates an empty table.
    ///
    /// `capacity` is a hint: it is clamped up to [`MIN_CAPACITY`] and
    /// rounded up to the next power of two. `load_factor` must lie in the
    /// open interval (0, 1); [`MapConfig`](crate::MapConfig) validates it
    /// for the map front-end.
    ///
    /// # Panics
    ///
    /// Panics with `capacity overflow` if the resolved slot arrays cannot be
    /// represented.
    pub fn with_capacity(capacity: usize, load_factor: f32) -> Self {
        debug_assert!(load_factor > 0.0 && load_factor < 1.0);

        let capacity = Capacity::from(capacity);
        let (keys, values) = allocate(capacity);
        IntTable {
            keys,
            values,
            len: 0,
            resize_threshold: resize_threshold(capacity.slots(), load_factor),
            load_factor,
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots, always a power of two.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Returns the configured load factor.
    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the population above which an insert grows the table,
    /// `floor(capacity * load_factor)`.
    #[inline]
    pub fn resize_threshold(&self) -> usize {
        self.resize_threshold
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.keys.len() - 1
    }

    /// Returns the slot index holding the key matching `eq`, if any.
    ///
    /// Probing starts at the key's ideal slot and walks forward until it
    /// finds either the key or an empty slot.
    #[inline]
    pub fn find_index(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<usize> {
        self.find_insert_slot(hash, eq).ok()
    }

    /// Probes for a key, returning `Ok(index)` of the slot holding it, or
    /// `Err(index)` of the empty slot where it would be inserted.
    #[inline]
    pub fn find_insert_slot(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Result<usize, usize> {
        let mask = self.mask();
        let mut index = spread(hash) & mask;
        // At least one slot is always empty (`resize_threshold < capacity`),
        // so this terminates within `capacity` steps.
        loop {
            match &self.keys[index] {
                None => return Err(index),
                Some(key) if eq(key) => return Ok(index),
                Some(_) => index = (index + 1) & mask,
            }
        }
    }

    /// Returns the key and value matching `eq`.
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(&K, &i32)> {
        let index = self.find_index(hash, eq)?;
        self.keys[index]
            .as_ref()
            .map(|key| (key, &self.values[index]))
    }

    /// Returns the value stored for the key matching `eq`.
    #[inline]
    pub fn get(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<i32> {
        self.find_index(hash, eq).map(|index| self.values[index])
    }

    /// Returns a mutable reference to the value stored for the key matching
    /// `eq`.
    #[inline]
    pub fn get_mut(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<&mut i32> {
        let index = self.find_index(hash, eq)?;
        Some(&mut self.values[index])
    }

    /// Returns the key held in slot `index`, or `None` for an empty slot.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys[index].as_ref()
    }

    /// Returns the value held in slot `index`, or `None` for an empty slot.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn value_at(&self, index: usize) -> Option<i32> {
        self.keys[index].as_ref().map(|_| self.values[index])
    }

    /// Overwrites the value held in the occupied slot `index`, returning the
    /// previous value, or `None` (writing nothing) if the slot is empty.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn replace_at(&mut self, index: usize, value: i32) -> Option<i32> {
        if self.keys[index].is_none() {
            return None;
        }
        Some(core::mem::replace(&mut self.values[index], value))
    }

    /// Returns `true` if any occupied slot holds `value`.
    pub fn contains_value(&self, value: i32) -> bool {
        self.iter().any(|(_, v)| v == value)
    }

    /// Gets an entry for the key matching `eq`.
    ///
    /// Unlike lookups, an entry keeps the `hasher` so that inserting through
    /// a vacant entry can grow the table, and removing through an occupied
    /// one can shift the rest of the probe chain back.
    #[inline]
    pub fn entry<H>(&mut self, hash: u64, eq: impl Fn(&K) -> bool, hasher: H) -> Entry<'_, K, H>
    where
        H: Fn(&K) -> u64,
    {
        match self.find_insert_slot(hash, eq) {
            Ok(index) => Entry::Occupied(OccupiedEntry {
                table: self,
                index,
                hasher,
            }),
            Err(index) => Entry::Vacant(VacantEntry {
                table: self,
                index,
                hasher,
            }),
        }
    }

    /// Removes the key matching `eq`, returning it with its value.
    pub fn remove(
        &mut self,
        hash: u64,
        eq: impl Fn(&K) -> bool,
        hasher: impl Fn(&K) -> u64,
    ) -> Option<(K, i32)> {
        let index = self.find_index(hash, eq)?;
        self.remove_at(index, hasher)
    }

    /// Removes the entry in slot `index`, then closes the gap it leaves in
    /// its probe chain. Returns `None` if the slot is empty.
    ///
    /// Entries later in the chain may move backward, so indices obtained
    /// before the call are no longer meaningful afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    pub fn remove_at(&mut self, index: usize, hasher: impl Fn(&K) -> u64) -> Option<(K, i32)> {
        let key = self.keys[index].take()?;
        let value = core::mem::take(&mut self.values[index]);
        self.len -= 1;
        self.close_gap(index, hasher);
        Some((key, value))
    }

    /// Backward-shift deletion.
    ///
    /// Walks the probe chain after `gap` up to the next empty slot. An entry
    /// whose probe path from its ideal slot passes over the gap is moved into
    /// it, and its old slot becomes the new gap. Entries whose ideal slot lies
    /// after the gap stay where they are, but the walk continues past them:
    /// the chain only ends at an empty slot.
    fn close_gap(&mut self, mut gap: usize, hasher: impl Fn(&K) -> u64) {
        let mask = self.mask();
        let mut index = gap;
        loop {
            index = (index + 1) & mask;
            let ideal = match &self.keys[index] {
                None => break,
                Some(key) => spread(hasher(key)) & mask,
            };

            if (index.wrapping_sub(ideal) & mask) >= (index.wrapping_sub(gap) & mask) {
                self.keys[gap] = self.keys[index].take();
                self.values[gap] = core::mem::take(&mut self.values[index]);
                gap = index;
            }
        }
        debug_assert!(self.keys[gap].is_none());
    }

    /// Removes every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.keys.iter_mut().for_each(|key| *key = None);
        self.values.fill(0);
        self.len = 0;
    }

    /// Shrinks the table to the smallest power-of-two capacity that holds
    /// the current entries without exceeding the load factor. Does nothing
    /// if no smaller capacity qualifies.
    pub fn compact(&mut self, hasher: impl Fn(&K) -> u64) {
        let mut capacity = Capacity::from(MIN_CAPACITY);
        while resize_threshold(capacity.slots(), self.load_factor) < self.len {
            capacity = capacity.doubled();
        }

        if capacity.slots() < self.capacity() {
            self.rehash(capacity, hasher);
        }
    }

    #[cold]
    fn grow(&mut self, hasher: impl Fn(&K) -> u64) {
        let mut capacity = Capacity::from(self.capacity()).doubled();
        while resize_threshold(capacity.slots(), self.load_factor) < self.len {
            capacity = capacity.doubled();
        }
        self.rehash(capacity, hasher);
    }

    /// Moves every entry into freshly allocated storage of `capacity` slots.
    fn rehash(&mut self, capacity: Capacity, hasher: impl Fn(&K) -> u64) {
        let (keys, values) = allocate(capacity);
        let old_keys = core::mem::replace(&mut self.keys, keys);
        let old_values = core::mem::replace(&mut self.values, values);
        self.resize_threshold = resize_threshold(capacity.slots(), self.load_factor);

        let mask = self.mask();
        for (key, &value) in old_keys.into_vec().into_iter().zip(old_values.iter()) {
            let Some(key) = key else {
                continue;
            };

            let mut index = spread(hasher(&key)) & mask;
            while self.keys[index].is_some() {
                index = (index + 1) & mask;
            }
            self.keys[index] = Some(key);
            self.values[index] = value;
        }

        debug_assert!(self.len <= self.resize_threshold);
    }

    /// Index of the first slot visited by a traversal.
    ///
    /// When the last slot is empty no probe chain wraps around, and the
    /// traversal is plain index order. Otherwise it begins just past the
    /// first empty slot, so that no chain straddles the start and entries
    /// shifted back by a removal mid-traversal are neither skipped nor seen
    /// twice.
    fn traversal_start(&self) -> usize {
        if self.keys[self.mask()].is_none() {
            return 0;
        }

        self.keys
            .iter()
            .position(Option::is_none)
            .map_or(0, |empty| (empty + 1) & self.mask())
    }

    /// Returns an iterator over the occupied slots as `(&K, i32)` pairs.
    pub fn iter(&self) -> Iter<'_, K> {
        let (head_keys, tail_keys) = self.keys.split_at(self.traversal_start());
        let (head_values, tail_values) = self.values.split_at(head_keys.len());
        Iter {
            tail: tail_keys.iter().zip(tail_values.iter()),
            head: head_keys.iter().zip(head_values.iter()),
            remaining: self.len,
        }
    }

    /// Returns an iterator over the occupied slots with mutable access to
    /// the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K> {
        let start = self.traversal_start();
        let (head_keys, tail_keys) = self.keys.split_at(start);
        let (head_values, tail_values) = self.values.split_at_mut(start);
        IterMut {
            tail: tail_keys.iter().zip(tail_values.iter_mut()),
            head: head_keys.iter().zip(head_values.iter_mut()),
            remaining: self.len,
        }
    }

    /// Removes and yields every entry. Entries not consumed are dropped when
    /// the iterator is.
    pub fn drain(&mut self) -> Drain<'_, K> {
        let (keys, values) = allocate(Capacity::from(self.capacity()));
        let keys = core::mem::replace(&mut self.keys, keys);
        let values = core::mem::replace(&mut self.values, values);
        let remaining = core::mem::take(&mut self.len);

        Drain {
            entries: keys.into_vec().into_iter().zip(values.into_vec()),
            remaining,
            marker: PhantomData,
        }
    }

    /// Computes a histogram of probe distances for the current table state.
    ///
    /// `counts()[d]` is the number of entries stored `d` slots past their
    /// ideal slot.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self, hasher: impl Fn(&K) -> u64) -> ProbeHistogram {
        let mask = self.mask();
        let mut counts = Vec::new();
        for (index, key) in self.keys.iter().enumerate() {
            let Some(key) = key else {
                continue;
            };

            let distance = index.wrapping_sub(spread(hasher(key)) & mask) & mask;
            if counts.len() <= distance {
                counts.resize(distance + 1, 0);
            }
            counts[distance] += 1;
        }

        ProbeHistogram { counts }
    }

    /// Collects occupancy and memory statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self, hasher: impl Fn(&K) -> u64) -> DebugStats {
        let histogram = self.probe_histogram(hasher);
        let slot_bytes = core::mem::size_of::<Option<K>>() + core::mem::size_of::<i32>();
        DebugStats {
            populated: self.len,
            capacity: self.capacity(),
            resize_threshold: self.resize_threshold,
            load_factor: self.load_factor,
            slot_utilization: if self.capacity() == 0 {
                0.0
            } else {
                self.len as f64 / self.capacity() as f64
            },
            max_probe_length: histogram.max_probe_length(),
            mean_probe_length: histogram.mean_probe_length(),
            total_bytes: self.capacity() * slot_bytes,
            wasted_bytes: (self.capacity() - self.len) * slot_bytes,
        }
    }
}

/// A view into a single slot of an [`IntTable`], which may either be vacant
/// or occupied.
///
/// Created by [`IntTable::entry`].
pub enum Entry<'a, K, H> {
    /// The key is present.
    Occupied(OccupiedEntry<'a, K, H>),
    /// The key is absent; this is where it would go.
    Vacant(VacantEntry<'a, K, H>),
}

impl<K, H> Entry<'_, K, H> {
    /// Returns the slot index the entry refers to.
    pub fn index(&self) -> usize {
        match self {
            Entry::Occupied(entry) => entry.index,
            Entry::Vacant(entry) => entry.index,
        }
    }
}

/// A view into an empty slot at the end of a key's probe path.
pub struct VacantEntry<'a, K, H> {
    table: &'a mut IntTable<K>,
    index: usize,
    hasher: H,
}

impl<K, H> VacantEntry<'_, K, H>
where
    H: Fn(&K) -> u64,
{
    /// Stores `key` and `value` in the slot, then grows the table if the
    /// insert pushed the population over the resize threshold.
    ///
    /// `key` must match the hash and equality predicate the entry was looked
    /// up with; otherwise the key is stored where lookups cannot find it.
    pub fn insert(self, key: K, value: i32) {
        let table = self.table;
        debug_assert!(table.keys[self.index].is_none());

        table.keys[self.index] = Some(key);
        table.values[self.index] = value;
        table.len += 1;

        if table.len > table.resize_threshold {
            table.grow(self.hasher);
        }
    }
}

/// A view into an occupied slot.
pub struct OccupiedEntry<'a, K, H> {
    table: &'a mut IntTable<K>,
    index: usize,
    hasher: H,
}

impl<'a, K, H> OccupiedEntry<'a, K, H> {
    #[inline]
    fn key_ref(&self) -> &K {
        match &self.table.keys[self.index] {
            Some(key) => key,
            None => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Returns the stored key.
    pub fn key(&self) -> &K {
        self.key_ref()
    }

    /// Returns the stored value.
    pub fn get(&self) -> i32 {
        self.table.values[self.index]
    }

    /// Returns a mutable reference to the stored value.
    pub fn get_mut(&mut self) -> &mut i32 {
        &mut self.table.values[self.index]
    }

    /// Converts the entry into a mutable reference to the stored value.
    pub fn into_mut(self) -> &'a mut i32 {
        let OccupiedEntry { table, index, .. } = self;
        &mut table.values[index]
    }

    /// Replaces the stored value, returning the previous one.
    pub fn insert(&mut self, value: i32) -> i32 {
        core::mem::replace(&mut self.table.values[self.index], value)
    }
}

impl<K, H> OccupiedEntry<'_, K, H>
where
    H: Fn(&K) -> u64,
{
    /// Removes the entry, returning its key and value.
    pub fn remove(self) -> (K, i32) {
        match self.table.remove_at(self.index, self.hasher) {
            Some(removed) => removed,
            None => unreachable!("occupied entry points at an empty slot"),
        }
    }
}

/// A traversal position over an [`IntTable`] that supports removing the
/// entry it last returned.
///
/// The cursor holds no borrow: every call takes the table it was created
/// for. Using it with a different table, or after the table was resized or
/// compacted, yields unspecified (but memory-safe) results.
#[derive(Clone, Copy, Debug)]
pub struct RawCursor {
    start: usize,
    visited: usize,
    current: Option<usize>,
}

impl RawCursor {
    /// Creates a cursor positioned before the first entry of `table`.
    pub fn new<K>(table: &IntTable<K>) -> Self {
        RawCursor {
            start: table.traversal_start(),
            visited: 0,
            current: None,
        }
    }

    /// Moves to the next occupied slot and returns its index.
    pub fn advance<K>(&mut self, table: &IntTable<K>) -> Option<usize> {
        let mask = table.mask();
        while self.visited < table.capacity() {
            let index = (self.start + self.visited) & mask;
            self.visited += 1;
            if table.keys[index].is_some() {
                self.current = Some(index);
                return Some(index);
            }
        }

        self.current = None;
        None
    }

    /// Returns the index of the entry last returned by
    /// [`advance`](Self::advance), unless it has since been removed.
    #[inline]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Removes the entry last returned by [`advance`](Self::advance).
    ///
    /// Returns `None` if there is no such entry: before the first advance,
    /// after exhaustion, or when it was already removed.
    pub fn remove_current<K>(
        &mut self,
        table: &mut IntTable<K>,
        hasher: impl Fn(&K) -> u64,
    ) -> Option<(K, i32)> {
        let index = self.current.take()?;
        let removed = table.remove_at(index, hasher)?;
        // The backward shift may have moved a not-yet-visited entry into the
        // vacated slot, so step back and look at it again.
        self.visited -= 1;
        Some(removed)
    }
}

type SlotIter<'a, K> = Zip<slice::Iter<'a, Option<K>>, slice::Iter<'a, i32>>;
type SlotIterMut<'a, K> = Zip<slice::Iter<'a, Option<K>>, slice::IterMut<'a, i32>>;

/// An iterator over the entries of an [`IntTable`].
///
/// Created by [`IntTable::iter`].
pub struct Iter<'a, K> {
    tail: SlotIter<'a, K>,
    head: SlotIter<'a, K>,
    remaining: usize,
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            tail: self.tail.clone(),
            head: self.head.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a K, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            let (key, value) = match self.tail.next() {
                Some(slot) => slot,
                None => self.head.next()?,
            };
            if let Some(key) = key {
                self.remaining -= 1;
                return Some((key, *value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

/// A mutable iterator over the entries of an [`IntTable`].
///
/// Created by [`IntTable::iter_mut`].
pub struct IterMut<'a, K> {
    tail: SlotIterMut<'a, K>,
    head: SlotIterMut<'a, K>,
    remaining: usize,
}

impl<'a, K> Iterator for IterMut<'a, K> {
    type Item = (&'a K, &'a mut i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            let (key, value) = match self.tail.next() {
                Some(slot) => slot,
                None => self.head.next()?,
            };
            if let Some(key) = key {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for IterMut<'_, K> {}

impl<K> FusedIterator for IterMut<'_, K> {}

/// A draining iterator over the entries of an [`IntTable`].
///
/// Created by [`IntTable::drain`]. The table is emptied before the first
/// entry is yielded; entries not consumed are dropped with the iterator.
pub struct Drain<'a, K> {
    entries: Zip<vec::IntoIter<Option<K>>, vec::IntoIter<i32>>,
    remaining: usize,
    marker: PhantomData<&'a mut IntTable<K>>,
}

impl<K> Iterator for Drain<'_, K> {
    type Item = (K, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (key, value) in &mut self.entries {
            if let Some(key) = key {
                self.remaining -= 1;
                return Some((key, value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Drain<'_, K> {}

impl<K> FusedIterator for Drain<'_, K> {}

/// Probe-distance histogram produced by [`IntTable::probe_histogram`].
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Entry counts indexed by distance from the ideal slot.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// The longest displacement of any entry, `0` for an empty table.
    pub fn max_probe_length(&self) -> usize {
        self.counts.len().saturating_sub(1)
    }

    /// The mean displacement over all entries.
    pub fn mean_probe_length(&self) -> f64 {
        let entries: usize = self.counts.iter().sum();
        if entries == 0 {
            return 0.0;
        }

        let total: usize = self
            .counts
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();
        total as f64 / entries as f64
    }

    /// Pretty-print the histogram.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let entries: usize = self.counts.iter().sum();
        println!("=== Probe Length Histogram ===");
        for (distance, count) in self.counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            println!(
                "{distance:>4}: {count:>8} ({:.2}%)",
                *count as f64 / entries as f64 * 100.0
            );
        }
    }
}

/// Debug statistics for table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Number of slots
    pub capacity: usize,
    /// Population above which the next insert grows the table
    pub resize_threshold: usize,
    /// Configured load factor
    pub load_factor: f32,
    /// Slot utilization (populated / capacity)
    pub slot_utilization: f64,
    /// Longest distance of an entry from its ideal slot
    pub max_probe_length: usize,
    /// Mean distance of an entry from its ideal slot
    pub mean_probe_length: f64,
    /// Total bytes of slot storage
    pub total_bytes: usize,
    /// Bytes of slot storage held by empty slots
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Int Table Debug Statistics ===");
        println!(
            "Population: {}/{} (threshold {}, load factor {:.2})",
            self.populated, self.capacity, self.resize_threshold, self.load_factor
        );
        println!(
            "Slot Usage: {:.2}% utilization",
            self.slot_utilization * 100.0
        );
        println!(
            "Probe Length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn hash(&self, key: u64) -> u64 {
            let mut h = SipHasher::new_with_keys(self.k0, self.k1);
            h.write_u64(key);
            h.finish()
        }
    }

    /// Hashes a key to itself, so tests can place keys in chosen slots.
    fn identity(key: &u64) -> u64 {
        *key
    }

    /// A raw hash whose spread lands in `slot` of a table with `mask`.
    fn hash_for_slot(slot: usize, mask: usize) -> u64 {
        (0u64..)
            .find(|h| spread(*h) & mask == slot)
            .unwrap()
    }

    fn insert(table: &mut IntTable<u64>, hasher: impl Fn(&u64) -> u64, key: u64, value: i32) {
        match table.entry(hasher(&key), |k| *k == key, &hasher) {
            Entry::Vacant(entry) => entry.insert(key, value),
            Entry::Occupied(_) => panic!("{key} already present in {table:#?}"),
        }
    }

    /// Every occupied slot must be reachable from its ideal slot without
    /// crossing an empty one.
    fn assert_reachable(table: &IntTable<u64>, hasher: impl Fn(&u64) -> u64) {
        let mask = table.mask();
        for (index, key) in table.keys.iter().enumerate() {
            let Some(key) = key else {
                continue;
            };
            let mut probe = spread(hasher(key)) & mask;
            while probe != index {
                assert!(
                    table.keys[probe].is_some(),
                    "gap at {probe} hides key {key} in slot {index}: {table:#?}"
                );
                probe = (probe + 1) & mask;
            }
        }
    }

    #[test]
    fn insert_and_find() {
        let state = HashState::default();
        let hasher = |k: &u64| state.hash(*k);
        let mut table = IntTable::with_capacity(0, 0.65);
        for k in 0..64u64 {
            insert(&mut table, hasher, k, k as i32 * 2);
            assert_eq!(table.get(hasher(&k), |v| *v == k), Some(k as i32 * 2));
        }

        assert_eq!(table.len(), 64);
        for k in 0..64u64 {
            assert_eq!(
                table.find(hasher(&k), |v| *v == k),
                Some((&k, &(k as i32 * 2)))
            );
        }
        assert_eq!(table.get(hasher(&64), |v| *v == 64), None);
    }

    #[test]
    fn capacity_is_clamped_and_rounded() {
        assert_eq!(IntTable::<u64>::with_capacity(0, 0.5).capacity(), MIN_CAPACITY);
        assert_eq!(IntTable::<u64>::with_capacity(3, 0.5).capacity(), MIN_CAPACITY);
        assert_eq!(IntTable::<u64>::with_capacity(33, 0.5).capacity(), 64);
        assert_eq!(IntTable::<u64>::with_capacity(64, 0.5).capacity(), 64);
        assert_eq!(IntTable::<u64>::with_capacity(64, 0.5).resize_threshold(), 32);
    }

    #[test]
    fn duplicate_entry_is_occupied() {
        let state = HashState::default();
        let hasher = |k: &u64| state.hash(*k);
        let mut table = IntTable::with_capacity(16, 0.5);
        insert(&mut table, hasher, 11, 1);

        match table.entry(hasher(&11), |k| *k == 11, hasher) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &11);
                assert_eq!(entry.insert(2), 1);
                assert_eq!(entry.get(), 2);
            }
            Entry::Vacant(_) => panic!("should be occupied: {table:#?}"),
        }
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(hasher(&11), |k| *k == 11), Some(2));
    }

    #[test]
    fn growth_happens_after_threshold_is_exceeded() {
        let mut table = IntTable::with_capacity(32, 0.5);
        for k in 0..16u64 {
            insert(&mut table, identity, k, k as i32);
        }
        assert_eq!(table.capacity(), 32);
        assert_eq!(table.resize_threshold(), 16);

        insert(&mut table, identity, 16, 16);
        assert_eq!(table.capacity(), 64);
        assert_eq!(table.resize_threshold(), 32);
        for k in 0..17u64 {
            assert_eq!(table.get(k, |v| *v == k), Some(k as i32));
        }
        assert_reachable(&table, identity);
    }

    #[test]
    fn tiny_load_factor_still_keeps_an_empty_slot() {
        let mut table = IntTable::with_capacity(8, 0.01);
        for k in 0..10u64 {
            insert(&mut table, identity, k, 1);
            assert!(table.len() <= table.resize_threshold());
            assert!(table.len() < table.capacity());
        }
    }

    #[test]
    fn remove_shifts_chain_back() {
        let mut table: IntTable<u64> = IntTable::with_capacity(16, 0.5);
        let mask = table.mask();
        // Three keys sharing ideal slot 5, one key whose ideal is 6.
        let h5 = hash_for_slot(5, mask);
        let h6 = hash_for_slot(6, mask);
        let hasher = |k: &u64| if *k == 3 { h6 } else { h5 };
        for k in [0u64, 1, 2, 3] {
            insert(&mut table, hasher, k, k as i32 + 100);
        }
        // Slots 5..=8 now hold 0, 1, 2, 3.
        assert_eq!(table.find_index(h5, |k| *k == 0), Some(5));
        assert_eq!(table.find_index(h6, |k| *k == 3), Some(8));

        assert_eq!(table.remove(h5, |k| *k == 0, hasher), Some((0, 100)));
        assert_eq!(table.find_index(h5, |k| *k == 1), Some(5));
        assert_eq!(table.find_index(h5, |k| *k == 2), Some(6));
        assert_eq!(table.find_index(h6, |k| *k == 3), Some(7));
        assert_eq!(table.key_at(8), None);
        assert_reachable(&table, hasher);
    }

    #[test]
    fn remove_skips_entries_at_home_but_keeps_scanning() {
        let mut table: IntTable<u64> = IntTable::with_capacity(16, 0.75);
        let mask = table.mask();
        let h2 = hash_for_slot(2, mask);
        let h3 = hash_for_slot(3, mask);
        let hasher = |k: &u64| match *k {
            0 => h2,
            1 => h3,
            _ => h2,
        };
        // 0 -> slot 2, 1 -> slot 3 (home), 2 -> slot 4 (ideal 2).
        for k in [0u64, 1, 2] {
            insert(&mut table, hasher, k, k as i32);
        }
        assert_eq!(table.find_index(h2, |k| *k == 2), Some(4));

        table.remove(h2, |k| *k == 0, hasher);
        // Key 1 is at home and stays; key 2 must still move back into slot 2.
        assert_eq!(table.find_index(h3, |k| *k == 1), Some(3));
        assert_eq!(table.find_index(h2, |k| *k == 2), Some(2));
        assert_reachable(&table, hasher);
    }

    #[test]
    fn remove_wraps_around_the_end() {
        let mut table: IntTable<u64> = IntTable::with_capacity(8, 0.75);
        let mask = table.mask();
        let h7 = hash_for_slot(7, mask);
        let hasher = |_: &u64| h7;
        for k in [0u64, 1, 2] {
            insert(&mut table, hasher, k, k as i32);
        }
        // 0 -> 7, 1 -> 0, 2 -> 1.
        assert_eq!(table.find_index(h7, |k| *k == 2), Some(1));

        table.remove(h7, |k| *k == 0, hasher);
        assert_eq!(table.find_index(h7, |k| *k == 1), Some(7));
        assert_eq!(table.find_index(h7, |k| *k == 2), Some(0));
        assert_reachable(&table, hasher);
    }

    #[test]
    fn random_removals_keep_everything_reachable() {
        let state = HashState::default();
        let hasher = |k: &u64| state.hash(*k) & 0xF;
        let mut table = IntTable::with_capacity(0, 0.9);
        for k in 0..200u64 {
            insert(&mut table, hasher, k, k as i32);
        }

        for k in (0..200u64).filter(|k| k % 3 != 0) {
            assert_eq!(
                table.remove(hasher(&k), |v| *v == k, hasher),
                Some((k, k as i32))
            );
            assert_reachable(&table, hasher);
        }

        for k in 0..200u64 {
            let expected = (k % 3 == 0).then_some(k as i32);
            assert_eq!(table.get(hasher(&k), |v| *v == k), expected);
        }
    }

    #[test]
    fn compact_shrinks_to_fit() {
        let state = HashState::default();
        let hasher = |k: &u64| state.hash(*k);
        let mut table = IntTable::with_capacity(0, 0.65);
        for k in 0..50u64 {
            insert(&mut table, hasher, k, k as i32);
        }
        let before = table.capacity();
        for k in 0..46u64 {
            table.remove(hasher(&k), |v| *v == k, hasher);
        }

        table.compact(hasher);
        assert!(table.capacity() < before);
        assert_eq!(table.capacity(), MIN_CAPACITY);
        for k in 46..50u64 {
            assert_eq!(table.get(hasher(&k), |v| *v == k), Some(k as i32));
        }

        let after = table.capacity();
        table.compact(hasher);
        assert_eq!(table.capacity(), after);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table = IntTable::with_capacity(0, 0.5);
        for k in 0..40u64 {
            insert(&mut table, identity, k, 1);
        }
        let capacity = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert!(table.values.iter().all(|value| *value == 0));
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.get(3, |k| *k == 3), None);
        assert!(!table.contains_value(1));
    }

    #[test]
    fn traversal_starts_after_an_empty_slot_when_last_is_full() {
        let mut table: IntTable<u64> = IntTable::with_capacity(8, 0.75);
        let mask = table.mask();
        let h7 = hash_for_slot(7, mask);
        let h3 = hash_for_slot(3, mask);
        let hasher = |k: &u64| if *k == 9 { h3 } else { h7 };
        for k in [0u64, 1, 9] {
            insert(&mut table, hasher, k, k as i32);
        }
        // Slots: 0 -> key 1, 3 -> key 9, 7 -> key 0. Slot 1 is the first
        // empty slot, so traversal runs 2..=7 then 0..=1.
        assert_eq!(table.traversal_start(), 2);
        let order: Vec<u64> = table.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, vec![9, 0, 1]);
    }

    #[test]
    fn cursor_remove_revisits_shifted_slot() {
        let mut table: IntTable<u64> = IntTable::with_capacity(16, 0.75);
        let mask = table.mask();
        let h4 = hash_for_slot(4, mask);
        let hasher = |_: &u64| h4;
        for k in 0..5u64 {
            insert(&mut table, hasher, k, k as i32);
        }

        let mut cursor = RawCursor::new(&table);
        let mut seen = Vec::new();
        while let Some(index) = cursor.advance(&table) {
            let key = *table.key_at(index).unwrap();
            seen.push(key);
            if key % 2 == 0 {
                assert_eq!(
                    cursor.remove_current(&mut table, hasher),
                    Some((key, key as i32))
                );
                assert!(cursor.remove_current(&mut table, hasher).is_none());
                assert_reachable(&table, hasher);
            }
        }

        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(table.len(), 2);
        let mut left: Vec<u64> = table.iter().map(|(k, _)| *k).collect();
        left.sort_unstable();
        assert_eq!(left, vec![1, 3]);
    }

    #[test]
    fn cursor_remove_before_advance_is_rejected() {
        let mut table = IntTable::with_capacity(8, 0.5);
        insert(&mut table, identity, 1, 1);
        let mut cursor = RawCursor::new(&table);
        assert!(cursor.remove_current(&mut table, identity).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn iter_mut_and_drain() {
        let state = HashState::default();
        let hasher = |k: &u64| state.hash(*k);
        let mut table = IntTable::with_capacity(0, 0.65);
        for k in 0..20u64 {
            insert(&mut table, hasher, k, k as i32);
        }

        for (_, value) in table.iter_mut() {
            *value *= 10;
        }
        assert_eq!(table.iter().len(), 20);
        assert_eq!(table.get(hasher(&7), |k| *k == 7), Some(70));

        let mut drained: Vec<(u64, i32)> = table.drain().collect();
        drained.sort_unstable();
        assert_eq!(drained.len(), 20);
        assert_eq!(drained[3], (3, 30));
        assert!(table.is_empty());
        assert_eq!(table.iter().next(), None);
    }

    #[test]
    fn partial_drain_empties_table_on_drop() {
        let mut table = IntTable::with_capacity(0, 0.5);
        for k in 0..10u64 {
            insert(&mut table, identity, k, 1);
        }
        let mut drain = table.drain();
        assert!(drain.next().is_some());
        drop(drain);
        assert!(table.is_empty());
        assert!(table.keys.iter().all(Option::is_none));
    }

    #[test]
    fn leaked_drain_leaves_table_consistent() {
        let shared = hash_for_slot(3, 7);
        let hasher = |_: &u64| shared;
        let mut table = IntTable::with_capacity(8, 0.9);
        for k in 0..5u64 {
            insert(&mut table, hasher, k, k as i32);
        }

        let mut drain = table.drain();
        assert_eq!(drain.len(), 5);
        assert!(drain.next().is_some());
        core::mem::forget(drain);

        assert_eq!(table.len(), 0);
        assert_eq!(table.len(), table.iter().count());
        assert_eq!(table.capacity(), 8);

        for k in 0..5u64 {
            insert(&mut table, hasher, k, 10);
        }
        assert_eq!(table.len(), 5);
        assert_eq!(table.iter().count(), 5);
        assert_reachable(&table, hasher);
    }

    #[test]
    fn histogram_output() {
        let state = HashState::default();
        let hasher = |k: &u64| state.hash(*k);
        let mut table = IntTable::with_capacity(0, 0.65);
        for k in 0..500u64 {
            insert(&mut table, hasher, k, 0);
        }

        let histogram = table.probe_histogram(hasher);
        assert_eq!(histogram.counts().iter().sum::<usize>(), 500);
        let stats = table.debug_stats(hasher);
        assert_eq!(stats.populated, 500);
        assert_eq!(stats.max_probe_length, histogram.max_probe_length());
        assert!(stats.slot_utilization <= 0.65);

        #[cfg(feature = "std")]
        {
            histogram.print();
            stats.print();
        }
    }

    #[test]
    fn test_clone() {
        let state = HashState::default();
        let hasher = |k: &u64| state.hash(*k);
        let mut table = IntTable::with_capacity(0, 0.65);
        for k in 0..30u64 {
            insert(&mut table, hasher, k, k as i32);
        }

        let mut cloned = table.clone();
        assert_eq!(cloned.len(), table.len());
        assert_eq!(cloned.capacity(), table.capacity());
        cloned.remove(hasher(&3), |k| *k == 3, hasher);
        assert_eq!(table.get(hasher(&3), |k| *k == 3), Some(3));
        assert_eq!(cloned.get(hasher(&3), |k| *k == 3), None);
    }
}
