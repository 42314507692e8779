use crate::error::PrefError;
use crate::storage::PrefStore;
use crate::value::PrefValue;

/// A single persisted value under one key.
///
/// Nothing is cached: `get` reads the store every time, `set` writes through.
#[derive(Debug, Clone)]
pub struct Pref<T, S> {
    store: S,
    key: String,
    default: T,
}

impl<T, S> Pref<T, S>
where
    T: PrefValue + Clone,
    S: PrefStore,
{
    /// Binds `key` in `store`; `default` is what `get` returns while the key is unset.
    pub fn new(store: S, key: impl Into<String>, default: T) -> Self {
        Pref {
            store,
            key: key.into(),
            default,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> Result<T, PrefError> {
        Ok(self
            .store
            .get(&self.key)?
            .and_then(T::try_from_scalar)
            .unwrap_or_else(|| self.default.clone()))
    }

    pub fn set(&self, value: T) -> Result<(), PrefError> {
        self.store.set(&self.key, value.into_scalar())?;
        Ok(())
    }

    /// Removes the key, so `get` goes back to returning the default.
    pub fn delete(&self) -> Result<(), PrefError> {
        self.store.delete(&self.key)?;
        Ok(())
    }

    pub fn exists(&self) -> Result<bool, PrefError> {
        Ok(self.store.has_key(&self.key)?)
    }
}
