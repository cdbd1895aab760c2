use std::path::Path;

use tempfile::tempdir;

use super::m3u::{parse_m3u_str, render_m3u};
use super::*;
use crate::error::Error;

#[test]
fn saved_playlist_reparses_to_same_locators_in_order() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path().join("lists"));

    let entries = vec![
        M3uEntry {
            locator: "/music/b.mp3".into(),
            title: Some("B".into()),
            duration_secs: Some(180),
        },
        M3uEntry::new("/music/a.mp3"),
        // Duplicates are kept.
        M3uEntry {
            locator: "/music/b.mp3".into(),
            title: Some("B, again".into()),
            duration_secs: Some(180),
        },
        M3uEntry::new("http://radio.example/live"),
    ];

    let path = store.save("evening", &entries).unwrap();
    assert_eq!(path, dir.path().join("lists").join("evening.m3u"));

    let parsed = parse_m3u(&path).unwrap();
    let locators: Vec<&str> = parsed.iter().map(|e| e.locator.as_str()).collect();
    assert_eq!(
        locators,
        vec![
            "/music/b.mp3",
            "/music/a.mp3",
            "/music/b.mp3",
            "http://radio.example/live"
        ]
    );
    assert_eq!(parsed[0].title.as_deref(), Some("B"));
    assert_eq!(parsed[0].duration_secs, Some(180));
    assert_eq!(parsed[2].title.as_deref(), Some("B, again"));
    assert_eq!(parsed[1].title, None);
}

#[test]
fn relative_entries_resolve_against_playlist_directory() {
    let text = "#EXTM3U\nsub/song.mp3\n/abs/song.mp3\nhttps://x.example/s\n";
    let parsed = parse_m3u_str(text, Some(Path::new("/lists")));
    assert_eq!(parsed[0].locator, "/lists/sub/song.mp3");
    assert_eq!(parsed[1].locator, "/abs/song.mp3");
    assert_eq!(parsed[2].locator, "https://x.example/s");
}

#[test]
fn plain_lists_without_header_still_parse() {
    let parsed = parse_m3u_str("# comment\n\n/a.mp3\n/b.mp3\n", None);
    assert_eq!(parsed.len(), 2);
    assert_eq!(render_m3u(&parsed), "#EXTM3U\n/a.mp3\n/b.mp3\n");
}

#[test]
fn save_rejects_empty_tracklists_and_bad_names() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path());

    assert!(matches!(store.save("x", &[]), Err(Error::EmptyTracklist)));
    let one = [M3uEntry::new("/a.mp3")];
    assert!(matches!(store.save("", &one), Err(Error::Validation(_))));
    assert!(matches!(store.save("../escape", &one), Err(Error::Validation(_))));
    assert!(matches!(store.save(".hidden", &one), Err(Error::Validation(_))));
}

#[test]
fn rename_and_delete_playlists() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path());
    store.save("old", &[M3uEntry::new("/a.mp3")]).unwrap();

    let renamed = store.rename("old.m3u", "new").unwrap();
    assert!(renamed.is_file());
    assert!(!dir.path().join("old.m3u").exists());

    store.delete("new").unwrap();
    assert!(!renamed.exists());

    assert!(matches!(store.delete("new"), Err(Error::NotFound(_))));
    assert!(matches!(store.rename("ghost", "other"), Err(Error::NotFound(_))));
}

#[test]
fn parse_missing_file_is_not_found() {
    let err = parse_m3u(Path::new("/no/such/list.m3u")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
