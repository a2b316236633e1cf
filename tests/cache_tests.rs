use perron::{
    cache::{self, DEPARTURES_KEY, FileStorage, MemoryStorage, OfflineStore, Storage},
    feed::RawDeparture,
    settings::UserPreferences,
    stops::StopGroup,
};
use std::{path::PathBuf, sync::Arc};

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn temp_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("perron-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    root
}

#[test]
fn compatible_when_cache_covers_request() {
    assert!(cache::is_compatible(&ids(&["A", "B"]), &ids(&["A"])));
    assert!(cache::is_compatible(&ids(&["A", "B"]), &ids(&["b", "a"])));
}

#[test]
fn incompatible_when_request_grows() {
    assert!(!cache::is_compatible(&ids(&["A"]), &ids(&["A", "B"])));
}

#[test]
fn incompatible_when_either_side_is_empty() {
    assert!(!cache::is_compatible(&[], &ids(&["A"])));
    assert!(!cache::is_compatible(&ids(&["A"]), &[]));
    assert!(!cache::is_compatible(&ids(&[" "]), &ids(&[" "])));
}

#[test]
fn missing_blobs_are_none() {
    let store = OfflineStore::in_memory();
    assert!(store.load_departures().is_none());
    assert!(store.load_preferences().is_none());
    assert!(store.load_stop_index().is_none());
}

#[test]
fn departures_are_stamped_and_deduplicated() {
    let store = OfflineStore::in_memory();
    let departures = vec![RawDeparture::default(), RawDeparture::default()];
    store
        .save_departures(&ids(&["U1", "u1", "U2"]), 30, &departures)
        .unwrap();

    let cached = store.load_departures().unwrap();
    assert_eq!(cached.data.stop_ids, ids(&["U1", "U2"]));
    assert_eq!(cached.data.minutes_after, 30);
    assert_eq!(cached.data.departures.len(), 2);
    assert!(cached.saved_at <= chrono::Utc::now());
}

#[test]
fn corrupt_blob_is_none() {
    let storage = Arc::new(MemoryStorage::new());
    storage.write(DEPARTURES_KEY, b"{not json").unwrap();
    let store = OfflineStore::new(storage);
    assert!(store.load_departures().is_none());
}

#[test]
fn preferences_can_be_cleared() {
    let store = OfflineStore::in_memory();
    let preferences = UserPreferences {
        minutes_after: 45,
        ..Default::default()
    };
    store.save_preferences(&preferences).unwrap();
    assert_eq!(store.load_preferences().unwrap().data, preferences);

    store.clear_preferences().unwrap();
    assert!(store.load_preferences().is_none());
    store.clear_preferences().unwrap();
}

#[test]
fn file_storage_round_trip() {
    let root = temp_root("round-trip");
    let store = OfflineStore::new(Arc::new(FileStorage::new(&root)));

    let mut group = StopGroup::new("Muzeum");
    group.add_stop_id("U400Z1");
    store.save_stop_index(&[group.clone()]).unwrap();
    assert!(root.join("stops.json").exists());
    assert!(!root.join("stops.json.tmp").exists());

    let reopened = OfflineStore::new(Arc::new(FileStorage::new(&root)));
    assert_eq!(reopened.load_stop_index().unwrap().data, vec![group]);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn file_storage_remove_missing_is_ok() {
    let root = temp_root("remove");
    let storage = FileStorage::new(&root);
    storage.remove("settings").unwrap();
    assert!(storage.read("settings").unwrap().is_none());
}
