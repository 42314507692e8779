use pref_list::{FileStore, Pref, PrefList};

fn main() {
    // Prefs live in the platform config directory, e.g. ~/.config/myapp/game.toml
    let store = FileStore::load_for_namespace("com.example.myapp", "game")
        .expect("Failed to load preferences");

    let recent_files: PrefList<String, _> = PrefList::new(&store, "RecentFiles");
    let max_recent = Pref::new(&store, "MaxRecent", 5);

    println!("Recent files:");
    for file in &recent_files {
        println!("  {}", file.expect("Failed to read recent file"));
    }

    // Move the newly opened file to the front, keeping the list short
    let opened = "notes.txt".to_string();
    {
        let _batch = store.batch();
        recent_files.remove(&opened).expect("Failed to remove");
        recent_files.insert(0, opened).expect("Failed to insert");
        let max = max_recent.get().expect("Failed to read MaxRecent").max(0) as usize;
        while recent_files.len().expect("Failed to read length") > max {
            recent_files.pop().expect("Failed to pop");
        }
        // The file is written once, when the batch guard drops
    }

    println!("\nUpdated recent files: {:?}", recent_files.to_vec().expect("Failed to read list"));
    println!("Preferences stored at: {}", store.path().display());
}
