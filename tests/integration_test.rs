#![cfg(not(target_arch = "wasm32"))]

use pref_list::{FileStore, Pref, PrefList, PrefStore, PrefStoreExt};

fn unique_dir(name: &str) -> String {
    format!("/tmp/pref_list_{}_{}", name, std::process::id())
}

#[test]
fn test_list_survives_reload() {
    let test_dir = unique_dir("reload");

    {
        let store = FileStore::load(&test_dir, "game").expect("First load should succeed");
        let levels: PrefList<String, _> = PrefList::new(&store, "UnlockedLevels");
        levels.push("forest".to_string()).unwrap();
        levels.push("cave".to_string()).unwrap();
        levels.insert(1, "river".to_string()).unwrap();
    }

    {
        let store = FileStore::load(&test_dir, "game").expect("Reload should succeed");
        let levels: PrefList<String, _> = PrefList::new(&store, "UnlockedLevels");
        assert_eq!(levels.to_vec().unwrap(), vec!["forest", "river", "cave"]);

        // The layout on disk follows the <base>/<index> convention
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("\"UnlockedLevels/Count\" = 3"));
        assert!(contents.contains("\"UnlockedLevels/1\" = \"river\""));
    }

    let _ = std::fs::remove_dir_all(&test_dir);
}

#[test]
fn test_complete_workflow() {
    let store = FileStore::load_testing().unwrap();

    let high_scores: PrefList<i32, _> = PrefList::new(&store, "HighScores");
    let sound_on = Pref::new(&store, "SoundOn", true);
    let player = Pref::new(&store, "PlayerName", "guest".to_string());

    // Defaults
    assert_eq!(high_scores.len().unwrap(), 0);
    assert!(sound_on.get().unwrap());
    assert_eq!(player.get().unwrap(), "guest");

    high_scores.extend([300, 100]).unwrap();
    high_scores.insert(1, 200).unwrap();
    sound_on.set(false).unwrap();
    player.set("alice".to_string()).unwrap();

    assert_eq!(high_scores.to_vec().unwrap(), vec![300, 200, 100]);
    assert_eq!(store.get_bool("SoundOn").unwrap(), false);
    assert_eq!(store.get_string("PlayerName").unwrap(), "alice");

    assert!(high_scores.remove(&200).unwrap());
    assert_eq!(high_scores.last().unwrap(), Some(100));

    high_scores.clear().unwrap();
    assert!(high_scores.is_empty().unwrap());
    assert!(!store.has_key("HighScores/0").unwrap());
}

#[test]
fn test_lists_with_distinct_base_keys_are_independent() {
    let store = FileStore::load_testing().unwrap();
    let a: PrefList<i32, _> = PrefList::new(&store, "A");
    let b: PrefList<i32, _> = PrefList::new(&store, "B");

    a.extend([1, 2, 3]).unwrap();
    b.push(9).unwrap();
    a.remove_at(0).unwrap();

    assert_eq!(a.to_vec().unwrap(), vec![2, 3]);
    assert_eq!(b.to_vec().unwrap(), vec![9]);
}

#[test]
fn test_reads_data_written_by_hand() {
    let store = FileStore::load_testing().unwrap();
    store.set_int("Legacy/Count", 2).unwrap();
    store.set_float("Legacy/0", 1.5).unwrap();
    store.set_float("Legacy/1", 2.5).unwrap();

    let legacy: PrefList<f32, _> = PrefList::new(&store, "Legacy");
    assert_eq!(legacy.to_vec().unwrap(), vec![1.5, 2.5]);
}
