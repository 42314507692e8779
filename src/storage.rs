use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::value::{PrefValue, Scalar};

/// Storage abstraction for flat, string-keyed preference stores.
///
/// This is the only thing [`Pref`](crate::Pref) and [`PrefList`](crate::PrefList)
/// know about persistence. Reading a key that was never set returns `Ok(None)`;
/// deleting an absent key is a no-op.
pub trait PrefStore: Send + Sync + Debug {
    /// Read the scalar stored under `key`
    fn get(&self, key: &str) -> Result<Option<Scalar>, std::io::Error>;

    /// Insert or overwrite the scalar under `key`
    fn set(&self, key: &str, value: Scalar) -> Result<(), std::io::Error>;

    /// Remove `key` from the store
    fn delete(&self, key: &str) -> Result<(), std::io::Error>;

    fn has_key(&self, key: &str) -> Result<bool, std::io::Error> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove every key this store owns
    fn delete_all(&self) -> Result<(), std::io::Error>;

    /// Where the data lives, for display purposes
    fn location(&self) -> String;
}

macro_rules! forward_pref_store {
    ($($wrapper:ty),*) => {
        $(
            impl<S: PrefStore + ?Sized> PrefStore for $wrapper {
                fn get(&self, key: &str) -> Result<Option<Scalar>, std::io::Error> {
                    (**self).get(key)
                }

                fn set(&self, key: &str, value: Scalar) -> Result<(), std::io::Error> {
                    (**self).set(key, value)
                }

                fn delete(&self, key: &str) -> Result<(), std::io::Error> {
                    (**self).delete(key)
                }

                fn has_key(&self, key: &str) -> Result<bool, std::io::Error> {
                    (**self).has_key(key)
                }

                fn delete_all(&self) -> Result<(), std::io::Error> {
                    (**self).delete_all()
                }

                fn location(&self) -> String {
                    (**self).location()
                }
            }
        )*
    };
}

forward_pref_store!(&S, Arc<S>, Box<S>);

macro_rules! typed_accessors {
    ($($name:ident: $type:ty),* $(,)?) => {
        paste::paste! {
            $(
                /// Reads the value, or its zero value when absent or of another kind.
                fn [<get_ $name>](&self, key: &str) -> Result<$type, std::io::Error> {
                    Ok(<$type>::from_scalar(self.get(key)?))
                }

                /// Reads the value, or `default` when absent or of another kind.
                fn [<get_ $name _or>](&self, key: &str, default: $type) -> Result<$type, std::io::Error> {
                    Ok(self.get(key)?.and_then(<$type>::try_from_scalar).unwrap_or(default))
                }

                fn [<set_ $name>](&self, key: &str, value: $type) -> Result<(), std::io::Error> {
                    self.set(key, value.into_scalar())
                }
            )*
        }
    };
}

/// Typed accessors in the `GetInt` / `SetInt` style, available on every store.
pub trait PrefStoreExt: PrefStore {
    typed_accessors! {
        int: i32,
        float: f32,
        string: String,
        bool: bool,
    }
}

impl<S: PrefStore + ?Sized> PrefStoreExt for S {}

/// A store that lives only in memory. Handy for tests and throwaway prefs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Scalar>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every entry currently held.
    pub fn snapshot(&self) -> BTreeMap<String, Scalar> {
        self.entries().clone()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Scalar>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Scalar>, std::io::Error> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: Scalar) -> Result<(), std::io::Error> {
        self.entries().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), std::io::Error> {
        self.entries().remove(key);
        Ok(())
    }

    fn delete_all(&self) -> Result<(), std::io::Error> {
        self.entries().clear();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::PrefStore;
    use crate::error::LoadError;
    use crate::value::Scalar;
    use once_cell::sync::Lazy;
    use std::collections::{BTreeMap, HashSet};
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use tracing::{debug, error};

    /// Files currently owned by a live `FileStore` in this process.
    static OPEN_FILES: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

    /// Releases the path in `OPEN_FILES` when dropped.
    #[derive(Debug)]
    struct FileClaim(PathBuf);

    impl FileClaim {
        fn acquire(path: &Path) -> Result<Self, LoadError> {
            let mut open = OPEN_FILES.lock().unwrap_or_else(PoisonError::into_inner);
            if !open.insert(path.to_path_buf()) {
                return Err(LoadError::InstanceAlreadyLoaded);
            }
            Ok(FileClaim(path.to_path_buf()))
        }
    }

    impl Drop for FileClaim {
        fn drop(&mut self) {
            OPEN_FILES
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.0);
        }
    }

    #[derive(Debug, Default)]
    struct FileState {
        entries: BTreeMap<String, Scalar>,
        batch_depth: usize,
        dirty: bool,
    }

    /// A store kept in a single TOML file, rewritten atomically on every change.
    ///
    /// Only one `FileStore` per file may be alive in a process at a time.
    #[derive(Debug)]
    pub struct FileStore {
        path: PathBuf,
        state: Mutex<FileState>,
        _claim: Option<FileClaim>,
        _temp_file: Option<tempfile::NamedTempFile>,
    }

    impl FileStore {
        /// Opens `<directory>/<file_stem>.toml`, starting empty if the file is missing.
        pub fn load(directory: impl AsRef<Path>, file_stem: &str) -> Result<Self, LoadError> {
            let path = std::path::absolute(directory.as_ref().join(format!("{}.toml", file_stem)))?;
            let claim = FileClaim::acquire(&path)?;
            let entries = read_entries(&path)?;
            debug!(path = %path.display(), entries = entries.len(), "prefs file loaded");
            Ok(FileStore {
                path,
                state: Mutex::new(FileState {
                    entries,
                    ..FileState::default()
                }),
                _claim: Some(claim),
                _temp_file: None,
            })
        }

        /// Opens `<file_stem>.toml` in the platform config directory for `namespace`,
        /// e.g. `"com.example.App"`.
        pub fn load_for_namespace(namespace: &str, file_stem: &str) -> Result<Self, LoadError> {
            let project = directories::ProjectDirs::from(namespace, "", "")
                .ok_or_else(|| LoadError::NoProjectDirectory(namespace.to_string()))?;
            Self::load(project.config_dir(), file_stem)
        }

        /// A store backed by a fresh temporary file, deleted when the store drops.
        /// Any number of these may be alive at once.
        pub fn load_testing() -> Result<Self, LoadError> {
            let tmp_file = tempfile::NamedTempFile::with_prefix("prefs")?;
            Ok(FileStore {
                path: tmp_file.path().to_path_buf(),
                state: Mutex::new(FileState::default()),
                _claim: None,
                _temp_file: Some(tmp_file),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Defers file writes until the returned guard is dropped or committed.
        ///
        /// Guards may nest; the file is written once, when the outermost one ends,
        /// and only if something changed.
        pub fn batch(&self) -> BatchGuard<'_> {
            self.state().batch_depth += 1;
            BatchGuard {
                store: self,
                finished: false,
            }
        }

        fn state(&self) -> MutexGuard<'_, FileState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn mutate<F>(&self, change: F) -> Result<(), std::io::Error>
        where
            F: FnOnce(&mut BTreeMap<String, Scalar>) -> bool,
        {
            let mut state = self.state();
            let previous = (state.batch_depth == 0).then(|| state.entries.clone());
            if !change(&mut state.entries) {
                return Ok(());
            }
            if state.batch_depth > 0 {
                state.dirty = true;
                return Ok(());
            }
            if let Err(e) = self.write_entries(&state.entries) {
                // Memory must not run ahead of the file
                if let Some(previous) = previous {
                    state.entries = previous;
                }
                return Err(e);
            }
            Ok(())
        }

        fn end_batch(&self) -> Result<(), std::io::Error> {
            let mut state = self.state();
            state.batch_depth = state.batch_depth.saturating_sub(1);
            if state.batch_depth == 0 && state.dirty {
                state.dirty = false;
                self.write_entries(&state.entries)?;
            }
            Ok(())
        }

        fn write_entries(&self, entries: &BTreeMap<String, Scalar>) -> Result<(), std::io::Error> {
            let data = toml::to_string(entries)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

            let parent_dir = match self.path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(parent_dir)?;

            // Write to temporary file first, then move it over the old one
            let mut tmp_file = tempfile::NamedTempFile::new_in(parent_dir)?;
            tmp_file.write_all(data.as_bytes())?;
            tmp_file.persist(&self.path).map_err(|e| e.error)?;

            debug!(path = %self.path.display(), entries = entries.len(), "prefs file written");
            Ok(())
        }
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, Scalar>, LoadError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| LoadError::DeserializationError(path.display().to_string(), e))
    }

    impl PrefStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<Scalar>, std::io::Error> {
            Ok(self.state().entries.get(key).cloned())
        }

        fn set(&self, key: &str, value: Scalar) -> Result<(), std::io::Error> {
            self.mutate(|entries| entries.insert(key.to_string(), value.clone()).as_ref() != Some(&value))
        }

        fn delete(&self, key: &str) -> Result<(), std::io::Error> {
            self.mutate(|entries| entries.remove(key).is_some())
        }

        fn delete_all(&self) -> Result<(), std::io::Error> {
            self.mutate(|entries| {
                let had_entries = !entries.is_empty();
                entries.clear();
                had_entries
            })
        }

        fn location(&self) -> String {
            self.path.display().to_string()
        }
    }

    /// Guard returned by [`FileStore::batch`]; flushes pending changes when it ends.
    #[derive(Debug)]
    pub struct BatchGuard<'a> {
        store: &'a FileStore,
        finished: bool,
    }

    impl BatchGuard<'_> {
        /// Ends the batch now and reports whether the write succeeded.
        pub fn commit(mut self) -> Result<(), std::io::Error> {
            self.finished = true;
            self.store.end_batch()
        }
    }

    impl Drop for BatchGuard<'_> {
        fn drop(&mut self) {
            if self.finished {
                return;
            }
            if let Err(e) = self.store.end_batch() {
                error!(path = %self.store.path.display(), error = %e, "failed to write batched prefs");
            }
        }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm {
    use super::PrefStore;
    use crate::value::Scalar;
    use serde::{Deserialize, Serialize};
    use web_sys::{window, Storage as WebStorage};

    /// How a single entry is written to localStorage, so the scalar kind survives.
    #[derive(Serialize, Deserialize)]
    struct Entry {
        value: Scalar,
    }

    fn js_error(message: &str) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, message.to_string())
    }

    /// A store in `window.localStorage`, namespaced by an app id prefix.
    #[derive(Debug)]
    pub struct LocalStore {
        prefix: String,
    }

    impl LocalStore {
        pub fn new(app_id: &str) -> Self {
            Self {
                prefix: format!("pref_list_{}_", app_id.replace('/', "_").replace('.', "_")),
            }
        }

        fn get_storage() -> Result<WebStorage, std::io::Error> {
            window()
                .ok_or_else(|| js_error("window not available"))?
                .local_storage()
                .map_err(|_| js_error("localStorage not available"))?
                .ok_or_else(|| js_error("localStorage is null"))
        }

        fn full_key(&self, key: &str) -> String {
            format!("{}{}", self.prefix, key)
        }
    }

    impl PrefStore for LocalStore {
        fn get(&self, key: &str) -> Result<Option<Scalar>, std::io::Error> {
            let raw = Self::get_storage()?
                .get_item(&self.full_key(key))
                .map_err(|_| js_error("failed to read from localStorage"))?;
            match raw {
                Some(text) => {
                    let entry: Entry = toml::from_str(&text)
                        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                    Ok(Some(entry.value))
                }
                None => Ok(None),
            }
        }

        fn set(&self, key: &str, value: Scalar) -> Result<(), std::io::Error> {
            let text = toml::to_string(&Entry { value })
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            Self::get_storage()?
                .set_item(&self.full_key(key), &text)
                .map_err(|_| js_error("failed to write to localStorage"))
        }

        fn delete(&self, key: &str) -> Result<(), std::io::Error> {
            Self::get_storage()?
                .remove_item(&self.full_key(key))
                .map_err(|_| js_error("failed to remove from localStorage"))
        }

        fn delete_all(&self) -> Result<(), std::io::Error> {
            let storage = Self::get_storage()?;
            let len = storage
                .length()
                .map_err(|_| js_error("failed to list localStorage"))?;
            let mut owned = Vec::new();
            for i in 0..len {
                if let Ok(Some(key)) = storage.key(i) {
                    if key.starts_with(&self.prefix) {
                        owned.push(key);
                    }
                }
            }
            for key in owned {
                storage
                    .remove_item(&key)
                    .map_err(|_| js_error("failed to remove from localStorage"))?;
            }
            Ok(())
        }

        fn location(&self) -> String {
            format!("localStorage::{}", self.prefix)
        }
    }
}

/// Platform-specific store factory
///
/// On native targets `id` is a directory holding `prefs.toml`; on WASM it is
/// the app id used to prefix localStorage keys.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_store(id: &str) -> Result<Box<dyn PrefStore>, crate::error::LoadError> {
    Ok(Box::new(native::FileStore::load(id, "prefs")?))
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn create_store(id: &str) -> Result<Box<dyn PrefStore>, crate::error::LoadError> {
    Ok(Box::new(wasm::LocalStore::new(id)))
}
