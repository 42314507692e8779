use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::error::PrefError;
use crate::pref::Pref;
use crate::storage::PrefStore;
use crate::value::PrefValue;

/// A list whose elements are persisted one key per item.
///
/// For a base key `"Scores"` the layout in the store is:
///
/// ```text
/// Scores/Count = 3
/// Scores/0     = 10
/// Scores/1     = 20
/// Scores/2     = 30
/// ```
///
/// The count is the only source of truth for the length. Keys at or past the
/// count may still exist in the store after a shrink and are never read back.
/// Every operation goes straight to the store; nothing is cached, so several
/// handles on the same base key always see each other's writes.
#[derive(Debug, Clone)]
pub struct PrefList<T, S> {
    store: S,
    base_key: String,
    count: Pref<i32, S>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> PrefList<T, S>
where
    T: PrefValue,
    S: PrefStore + Clone,
{
    pub fn new(store: S, base_key: impl Into<String>) -> Self {
        let base_key = base_key.into();
        let count = Pref::new(store.clone(), format!("{}/Count", base_key), 0);
        PrefList {
            store,
            base_key,
            count,
            _marker: PhantomData,
        }
    }
}

impl<T, S> PrefList<T, S>
where
    T: PrefValue,
    S: PrefStore,
{
    pub fn base_key(&self) -> &str {
        &self.base_key
    }

    /// Key holding the number of elements.
    pub fn count_key(&self) -> &str {
        self.count.key()
    }

    /// Key holding the element at `index`.
    pub fn item_key(&self, index: usize) -> String {
        format!("{}/{}", self.base_key, index)
    }

    pub fn len(&self) -> Result<usize, PrefError> {
        let raw = self.count.get()?;
        match usize::try_from(raw) {
            Ok(len) => Ok(len),
            Err(_) => {
                warn!(key = self.count_key(), count = raw, "negative list count, treating list as empty");
                Ok(0)
            }
        }
    }

    pub fn is_empty(&self) -> Result<bool, PrefError> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, index: usize) -> Result<T, PrefError> {
        let len = self.len()?;
        check_index(index, len)?;
        self.read(index)
    }

    /// Overwrites the element at `index`. The length is unchanged.
    pub fn set(&self, index: usize, value: T) -> Result<(), PrefError> {
        let len = self.len()?;
        check_index(index, len)?;
        self.write(index, value)
    }

    /// Appends `value` at the end of the list.
    pub fn push(&self, value: T) -> Result<(), PrefError> {
        let len = self.len()?;
        let grown = count_for(len + 1)?;
        self.write(len, value)?;
        self.count.set(grown)
    }

    pub fn extend<I>(&self, values: I) -> Result<(), PrefError>
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.push(value)?;
        }
        Ok(())
    }

    /// Inserts `value` at `index`, shifting everything after it one slot right.
    ///
    /// `index == len` appends. Anything larger is out of range.
    pub fn insert(&self, index: usize, value: T) -> Result<(), PrefError> {
        let len = self.len()?;
        if index > len {
            return Err(PrefError::IndexOutOfRange { index, len });
        }
        let grown = count_for(len + 1)?;
        // Top down, so no slot is overwritten before it has been copied.
        for slot in (index + 1..=len).rev() {
            let moved = self.read(slot - 1)?;
            self.write(slot, moved)?;
        }
        self.write(index, value)?;
        self.count.set(grown)?;
        debug!(key = %self.base_key, index, shifted = len - index, "inserted into pref list");
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting everything after it
    /// one slot left.
    ///
    /// The old last slot keeps its value in the store; it is past the count and
    /// no longer part of the list.
    pub fn remove_at(&self, index: usize) -> Result<T, PrefError> {
        let len = self.len()?;
        check_index(index, len)?;
        let shrunk = count_for(len - 1)?;
        let removed = self.read(index)?;
        for slot in index..len - 1 {
            let moved = self.read(slot + 1)?;
            self.write(slot, moved)?;
        }
        self.count.set(shrunk)?;
        debug!(key = %self.base_key, index, shifted = len - 1 - index, "removed from pref list");
        Ok(removed)
    }

    /// Removes and returns the last element, deleting its key.
    pub fn pop(&self) -> Result<Option<T>, PrefError> {
        let len = self.len()?;
        if len == 0 {
            return Ok(None);
        }
        let shrunk = count_for(len - 1)?;
        let last = self.read(len - 1)?;
        self.store.delete(&self.item_key(len - 1))?;
        self.count.set(shrunk)?;
        Ok(Some(last))
    }

    pub fn first(&self) -> Result<Option<T>, PrefError> {
        if self.is_empty()? {
            return Ok(None);
        }
        self.read(0).map(Some)
    }

    pub fn last(&self) -> Result<Option<T>, PrefError> {
        match self.len()? {
            0 => Ok(None),
            len => self.read(len - 1).map(Some),
        }
    }

    /// Deletes every element key, then resets the count to zero.
    pub fn clear(&self) -> Result<(), PrefError> {
        let len = self.len()?;
        for index in 0..len {
            self.store.delete(&self.item_key(index))?;
        }
        self.count.set(0)?;
        debug!(key = %self.base_key, removed = len, "cleared pref list");
        Ok(())
    }

    /// Iterates the list, reading each element from the store as it goes.
    ///
    /// The length is re-read on every step, so changes made through another
    /// handle while iterating are visible.
    pub fn iter(&self) -> Iter<'_, T, S> {
        Iter {
            list: self,
            next: 0,
            failed: false,
        }
    }

    pub fn to_vec(&self) -> Result<Vec<T>, PrefError> {
        self.iter().collect()
    }

    fn read(&self, index: usize) -> Result<T, PrefError> {
        let key = self.item_key(index);
        let Some(scalar) = self.store.get(&key)? else {
            return Ok(T::zero());
        };
        let stored = scalar.kind();
        Ok(T::try_from_scalar(scalar).unwrap_or_else(|| {
            warn!(key = %key, stored, "pref list element has another kind, reading it as zero");
            T::zero()
        }))
    }

    fn write(&self, index: usize, value: T) -> Result<(), PrefError> {
        self.store.set(&self.item_key(index), value.into_scalar())?;
        Ok(())
    }
}

impl<T, S> PrefList<T, S>
where
    T: PrefValue + PartialEq,
    S: PrefStore,
{
    /// Index of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Result<Option<usize>, PrefError> {
        let len = self.len()?;
        for index in 0..len {
            if self.read(index)? == *value {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    pub fn contains(&self, value: &T) -> Result<bool, PrefError> {
        Ok(self.index_of(value)?.is_some())
    }

    /// Removes the first element equal to `value`. Returns whether one was found.
    pub fn remove(&self, value: &T) -> Result<bool, PrefError> {
        match self.index_of(value)? {
            Some(index) => {
                self.remove_at(index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// The count key value for `len`, checked before the list is touched.
fn count_for(len: usize) -> Result<i32, PrefError> {
    let count = i32::try_from(len).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("pref list length {} does not fit in the count key", len),
        )
    })?;
    Ok(count)
}

fn check_index(index: usize, len: usize) -> Result<(), PrefError> {
    if index >= len {
        return Err(PrefError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Iterator returned by [`PrefList::iter`]. Stops after the first store error.
#[derive(Debug)]
pub struct Iter<'a, T, S> {
    list: &'a PrefList<T, S>,
    next: usize,
    failed: bool,
}

impl<T, S> Iterator for Iter<'_, T, S>
where
    T: PrefValue,
    S: PrefStore,
{
    type Item = Result<T, PrefError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let len = match self.list.len() {
            Ok(len) => len,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        if self.next >= len {
            return None;
        }
        let item = self.list.read(self.next);
        self.next += 1;
        self.failed = item.is_err();
        Some(item)
    }
}

impl<'a, T, S> IntoIterator for &'a PrefList<T, S>
where
    T: PrefValue,
    S: PrefStore,
{
    type Item = Result<T, PrefError>;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
