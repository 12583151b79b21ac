use super::memory::MemoryCatalog;
use super::model::{NewAlbum, NewTrack};

const ARTIST: &str = "Yo Yo Honey Singh";
const COVER_A: &str = "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=400";
const COVER_B: &str = "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=400";
const SAMPLE_AUDIO: &str = "https://www.soundjay.com/misc/sounds/bell-ringing-05.wav";

// (title, cover, year)
const ALBUMS: [(&str, &str, i32); 4] = [
    ("Desi Kalakaar", COVER_A, 2014),
    ("Glory", COVER_B, 2021),
    ("International Villager", COVER_A, 2012),
    ("King Kohli", COVER_B, 2023),
];

// (title, artist, album index, seconds, plays)
const TRACKS: [(&str, &str, usize, f64, u64); 6] = [
    ("Blue Eyes", ARTIST, 0, 225.0, 1_500_000),
    ("Angreji Beat", "Yo Yo Honey Singh ft. Gippy Grewal", 1, 252.0, 2_000_000),
    ("Brown Rang", ARTIST, 2, 208.0, 1_800_000),
    ("Lungi Dance", ARTIST, 0, 245.0, 3_000_000),
    ("Dope Shope", "Yo Yo Honey Singh ft. Deep Money", 2, 232.0, 1_200_000),
    ("Love Dose", ARTIST, 1, 258.0, 2_500_000),
];

pub(super) fn populate(catalog: &MemoryCatalog) {
    let albums: Vec<_> = ALBUMS
        .iter()
        .map(|(title, cover, year)| {
            catalog.create_album(NewAlbum {
                title: title.to_string(),
                artist: ARTIST.to_string(),
                cover_url: cover.to_string(),
                release_year: Some(*year),
            })
        })
        .collect();

    for (title, artist, album_idx, duration, plays) in TRACKS {
        let album = &albums[album_idx];
        catalog.create_track_with_plays(
            NewTrack {
                title: title.to_string(),
                artist: artist.to_string(),
                album_id: Some(album.id),
                duration,
                audio_url: SAMPLE_AUDIO.to_string(),
                cover_url: album.cover_url.clone(),
            },
            plays,
        );
    }
}
