use pref_list::{MemoryStore, PrefList, PrefStore};
use std::sync::{Arc, Mutex};
use std::thread;

#[test]
fn test_concurrent_pushes_with_mutex() {
    let store: Arc<dyn PrefStore> = Arc::new(MemoryStore::new());
    let list = Arc::new(Mutex::new(PrefList::<i32, _>::new(Arc::clone(&store), "Events")));
    let mut handles = vec![];

    // Spawn 10 threads that each append their id
    for i in 0..10 {
        let list_clone = Arc::clone(&list);
        let handle = thread::spawn(move || {
            let list = list_clone.lock().unwrap();
            list.push(i).expect("Push should succeed");
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let list = list.lock().unwrap();
    assert_eq!(list.len().unwrap(), 10);
    let mut values = list.to_vec().unwrap();
    values.sort();
    assert_eq!(values, (0..10).collect::<Vec<_>>());
}

#[test]
fn test_handles_on_separate_threads_see_each_other() {
    let store = Arc::new(MemoryStore::new());
    let writer = PrefList::<String, _>::new(Arc::clone(&store), "Log");
    writer.push("first".to_string()).unwrap();

    let reader_store = Arc::clone(&store);
    let seen = thread::spawn(move || {
        let reader = PrefList::<String, _>::new(reader_store, "Log");
        reader.to_vec().unwrap()
    })
    .join()
    .unwrap();

    assert_eq!(seen, vec!["first"]);
}
