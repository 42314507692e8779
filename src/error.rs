use std::fmt;

/// Errors returned by [`Pref`](crate::Pref) and [`PrefList`](crate::PrefList) operations.
#[derive(Debug)]
pub enum PrefError {
    /// An index outside `0..len` (or `0..=len` for inserts).
    IndexOutOfRange { index: usize, len: usize },
    /// The backing store failed; the backend's error is passed through as is.
    Storage(std::io::Error),
}

impl fmt::Display for PrefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefError::IndexOutOfRange { index, len } => {
                write!(f, "index out of range: the len is {} but the index is {}", len, index)
            }
            PrefError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for PrefError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrefError::Storage(e) => Some(e),
            PrefError::IndexOutOfRange { .. } => None,
        }
    }
}

impl From<std::io::Error> for PrefError {
    fn from(e: std::io::Error) -> Self {
        PrefError::Storage(e)
    }
}

/// Errors that can occur when opening a file-backed store.
#[derive(Debug)]
pub enum LoadError {
    /// Another live store already owns this file.
    InstanceAlreadyLoaded,
    /// No config directory could be resolved for the namespace.
    NoProjectDirectory(String),
    /// Reading the file failed.
    StorageError(std::io::Error),
    /// The file exists but isn't valid prefs TOML.
    DeserializationError(String, toml::de::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::InstanceAlreadyLoaded => {
                write!(f, "another store instance already owns this file")
            }
            LoadError::NoProjectDirectory(namespace) => {
                write!(f, "no config directory for namespace '{}'", namespace)
            }
            LoadError::StorageError(e) => write!(f, "storage error: {}", e),
            LoadError::DeserializationError(location, e) => {
                write!(f, "failed to parse prefs at {}: {}", location, e)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::StorageError(e) => Some(e),
            LoadError::DeserializationError(_, e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::StorageError(e)
    }
}
