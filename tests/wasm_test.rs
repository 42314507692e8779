#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use pref_list::storage::{create_store, wasm::LocalStore, PrefStore, PrefStoreExt};
use pref_list::PrefList;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_wasm_list_round_trip() {
    let store = LocalStore::new("com.example.wasm-list");
    store.delete_all().expect("Failed to reset store");

    let list: PrefList<i32, _> = PrefList::new(&store, "Numbers");
    list.extend([10, 20, 30]).expect("Failed to push");
    list.insert(1, 15).expect("Failed to insert");
    assert_eq!(list.to_vec().unwrap(), vec![10, 15, 20, 30]);

    // A second handle on a fresh store instance reads the same data
    let again = LocalStore::new("com.example.wasm-list");
    let reread: PrefList<i32, _> = PrefList::new(&again, "Numbers");
    assert_eq!(reread.len().unwrap(), 4);
}

#[wasm_bindgen_test]
fn test_wasm_scalar_kinds_survive() {
    let store = LocalStore::new("com.example.wasm-kinds");
    store.set_float("ratio", 0.5).unwrap();
    store.set_string("name", "ada".to_string()).unwrap();
    assert_eq!(store.get_float("ratio").unwrap(), 0.5);
    assert_eq!(store.get_string("name").unwrap(), "ada");
    assert_eq!(store.get_int("ratio").unwrap(), 0);
}

#[wasm_bindgen_test]
fn test_wasm_delete_all_only_touches_own_prefix() {
    let mine = LocalStore::new("com.example.mine");
    let theirs = LocalStore::new("com.example.theirs");
    mine.set_int("k", 1).unwrap();
    theirs.set_int("k", 2).unwrap();

    mine.delete_all().unwrap();
    assert!(!mine.has_key("k").unwrap());
    assert_eq!(theirs.get_int("k").unwrap(), 2);
}

#[wasm_bindgen_test]
fn test_wasm_storage_location() {
    let store = create_store("com.example.wasm-location").unwrap();
    assert!(store.location().starts_with("localStorage::"));
}
