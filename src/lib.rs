//! # pref_list
//!
//! Persistent lists and scalar prefs on top of flat key-value preference stores.
//!
//! Preference stores in the style of `PlayerPrefs` only know how to get, set and
//! delete single scalars under string keys. This library builds two things on
//! top of that:
//!
//! - [`Pref`]: one typed value under one key, with a default for when it is unset.
//! - [`PrefList`]: an ordered list stored one element per key, plus a count.
//!
//! The design priorities are:
//!
//! - **Interoperability:** The key layout (`<base>/Count`, `<base>/0`, `<base>/1`, ...)
//!   is fixed, so lists written by other tools using the same convention read back fine.
//! - **Pluggable storage:** Everything goes through the [`PrefStore`] trait. Use
//!   [`MemoryStore`] in tests, [`FileStore`](storage::native::FileStore) on desktop,
//!   or bring your own.
//! - **No hidden state:** Nothing is cached. Every read and write goes to the store.
//!
//! **Note:** Each list operation costs one store round-trip per element it touches,
//! and inserts/removals shift every later element. This is NOT intended for large
//! quantities of data. There is also no atomicity across keys: if the process dies
//! mid-shift, the list can be left half-shifted.
//!
//! ## Example
//!
//! ```rust
//! use pref_list::{MemoryStore, PrefList};
//!
//! # fn main() -> Result<(), pref_list::PrefError> {
//! let store = MemoryStore::new();
//! let scores: PrefList<i32, _> = PrefList::new(&store, "Scores");
//!
//! scores.push(10)?;
//! scores.push(30)?;
//! scores.insert(1, 20)?;
//! assert_eq!(scores.to_vec()?, vec![10, 20, 30]);
//!
//! scores.remove(&10)?;
//! assert_eq!(scores.len()?, 2);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod list;
pub mod pref;
pub mod storage;
pub mod value;

pub use error::{LoadError, PrefError};
pub use list::PrefList;
pub use pref::Pref;
pub use storage::{MemoryStore, PrefStore, PrefStoreExt};
pub use value::{PrefValue, Scalar};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::native::FileStore;
