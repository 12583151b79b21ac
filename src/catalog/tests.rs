use super::*;

fn new_track(title: &str, artist: &str) -> NewTrack {
    NewTrack {
        title: title.to_string(),
        artist: artist.to_string(),
        album_id: None,
        duration: 180.0,
        audio_url: "file:///tmp/x.wav".to_string(),
        cover_url: String::new(),
    }
}

#[test]
fn seeded_catalog_has_demo_albums_and_tracks() {
    let c = MemoryCatalog::seeded();
    let albums = c.list_albums().unwrap();
    assert_eq!(albums.len(), 4);
    assert_eq!(albums[0].title, "Desi Kalakaar");
    assert_eq!(albums[3].release_year, Some(2023));

    let tracks = c.list_tracks().unwrap();
    assert_eq!(tracks.len(), 6);
    assert_eq!(tracks[0].title, "Blue Eyes");
    assert_eq!(tracks[0].play_count, 1_500_000);
    assert_eq!(tracks[0].cover_url, albums[0].cover_url);
    assert_eq!(tracks[5].id, 6);
}

#[test]
fn tracks_by_album_filters_on_album_id() {
    let c = MemoryCatalog::seeded();
    let titles: Vec<String> = c
        .tracks_by_album(1)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Blue Eyes", "Lungi Dance"]);
    assert!(c.tracks_by_album(4).unwrap().is_empty());
    assert!(c.tracks_by_album(42).unwrap().is_empty());
}

#[test]
fn get_unknown_ids_return_none() {
    let c = MemoryCatalog::seeded();
    assert!(c.get_track(99).unwrap().is_none());
    assert!(c.get_album(0).unwrap().is_none());
    assert_eq!(c.get_album(2).unwrap().unwrap().title, "Glory");
}

#[test]
fn search_matches_title_or_artist_ignoring_case() {
    let c = MemoryCatalog::seeded();
    assert_eq!(c.search_tracks("HONEY").unwrap().len(), 6);

    let gippy = c.search_tracks("gippy").unwrap();
    assert_eq!(gippy.len(), 1);
    assert_eq!(gippy[0].title, "Angreji Beat");

    let dance = c.search_tracks("dAnCe").unwrap();
    assert_eq!(dance.len(), 1);
    assert_eq!(dance[0].title, "Lungi Dance");

    assert!(c.search_tracks("zzz").unwrap().is_empty());
}

#[test]
fn created_records_get_sequential_ids() {
    let c = MemoryCatalog::new();
    let a = c.create_track(new_track("One", "A"));
    let b = c.create_track(new_track("Two", "B"));
    assert_eq!((a.id, b.id), (1, 2));
    assert_eq!(a.play_count, 0);

    let p = c.create_playlist(NewPlaylist {
        title: "Mix".to_string(),
        user_id: Some(1),
        cover_url: None,
    });
    assert_eq!(p.id, 1);
    assert_eq!(c.list_playlists().unwrap(), vec![p]);
}

#[test]
fn increment_play_count_bumps_and_ignores_unknown() {
    let c = MemoryCatalog::seeded();
    c.increment_play_count(2).unwrap();
    c.increment_play_count(2).unwrap();
    assert_eq!(c.get_track(2).unwrap().unwrap().play_count, 2_000_002);
    assert!(c.increment_play_count(404).is_ok());
}

#[test]
fn toml_catalog_loads_records_and_continues_ids() {
    let c = MemoryCatalog::from_toml_str(
        r#"
[[albums]]
id = 7
title = "Tapes"
artist = "Someone"

[[tracks]]
id = 10
title = "Side A"
artist = "Someone"
album_id = 7
duration = 61.5
audio_url = "/music/a.flac"

[[tracks]]
id = 11
title = "Side B"
artist = "Someone"
albumId = 7
audioUrl = "/music/b.flac"
playCount = 3
"#,
    )
    .unwrap();

    assert_eq!(c.tracks_by_album(7).unwrap().len(), 2);
    assert_eq!(c.get_track(11).unwrap().unwrap().play_count, 3);
    assert_eq!(c.create_track(new_track("Next", "X")).id, 12);
    assert!(c.list_playlists().unwrap().is_empty());
}

#[test]
fn toml_catalog_rejects_malformed_input() {
    let err = MemoryCatalog::from_toml_str("[[tracks]]\nid = \"nope\"").unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)));
}

#[test]
fn toml_catalog_file_missing_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MemoryCatalog::from_toml_file(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
}

#[test]
fn track_json_accepts_null_play_count() {
    let t: Track = serde_json::from_str(
        r#"{"id":1,"title":"T","artist":"A","albumId":null,"duration":12,"audioUrl":"u","coverUrl":"c","playCount":null}"#,
    )
    .unwrap();
    assert_eq!(t.play_count, 0);
    assert_eq!(t.album_id, None);
}

#[test]
fn format_time_renders_minutes_and_seconds() {
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(5.9), "0:05");
    assert_eq!(format_time(225.0), "3:45");
    assert_eq!(format_time(3600.0), "60:00");
}

#[test]
fn format_play_count_compacts_large_numbers() {
    assert_eq!(format_play_count(999), "999");
    assert_eq!(format_play_count(2_000), "2.0K");
    assert_eq!(format_play_count(1_500_000), "1.5M");
    assert_eq!(format_play_count(3_000_000), "3.0M");
}
