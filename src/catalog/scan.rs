use std::collections::BTreeMap;
use std::path::Path;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::memory::MemoryCatalog;
use super::model::{NewAlbum, NewTrack};

const UNKNOWN_ARTIST: &str = "Unknown Artist";

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_empty(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Debug)]
struct ScannedFile {
    url: String,
    title: String,
    artist: Option<String>,
    album: Option<String>,
    seconds: f64,
}

impl ScannedFile {
    fn sort_key(&self) -> String {
        match &self.artist {
            Some(a) => format!("{a} - {}", self.title).to_lowercase(),
            None => self.title.to_lowercase(),
        }
    }
}

fn read_file(path: &Path) -> ScannedFile {
    let mut file = ScannedFile {
        url: path.to_string_lossy().into_owned(),
        title: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string(),
        artist: None,
        album: None,
        seconds: 0.0,
    };

    // Unreadable tags are fine: the file stem stands in for the title.
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            log::debug!("no tags for {}: {e}", path.display());
            return file;
        }
    };
    file.seconds = tagged.properties().duration().as_secs_f64();

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(title) = non_empty(tag.title()) {
            file.title = title;
        }
        file.artist = non_empty(tag.artist());
        file.album = non_empty(tag.album());
    }
    file
}

/// Walk `dir` and build a catalog from the audio files found there.
///
/// Tracks are ordered by "artist - title" (case-insensitive) and given ids in that
/// order. Files sharing an album tag are grouped into one album.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> MemoryCatalog {
    let mut files: Vec<ScannedFile> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            files.push(read_file(path));
        }
    }

    files.sort_by_key(ScannedFile::sort_key);
    log::info!("scanned {} audio files under {}", files.len(), dir.display());

    let catalog = MemoryCatalog::new();
    let mut album_ids: BTreeMap<String, u64> = BTreeMap::new();

    for file in files {
        let album_id = file.album.as_ref().map(|name| {
            *album_ids.entry(name.clone()).or_insert_with(|| {
                catalog
                    .create_album(NewAlbum {
                        title: name.clone(),
                        artist: file
                            .artist
                            .clone()
                            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
                        cover_url: String::new(),
                        release_year: None,
                    })
                    .id
            })
        });

        catalog.create_track(NewTrack {
            title: file.title,
            artist: file.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album_id,
            duration: file.seconds,
            audio_url: file.url,
            cover_url: String::new(),
        });
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataProvider;
    use std::fs;
    use tempfile::tempdir;

    fn titles(catalog: &MemoryCatalog) -> Vec<String> {
        catalog
            .list_tracks()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect()
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_case_insensitive() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let catalog = scan(dir.path(), &LibrarySettings::default());
        let tracks = catalog.list_tracks().unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "A");
        assert_eq!(tracks[0].id, 1);
        assert_eq!(tracks[0].artist, UNKNOWN_ARTIST);
        assert!(tracks[0].audio_url.ends_with("A.ogg"));
        assert_eq!(tracks[1].title, "b");
        assert!(catalog.list_albums().unwrap().is_empty());
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        assert_eq!(titles(&scan(dir.path(), &settings)), vec!["visible"]);
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        assert_eq!(titles(&scan(dir.path(), &settings)), vec!["root"]);
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir depth counts root as 0, children as 1, grandchildren as 2.
        let settings = LibrarySettings {
            max_depth: Some(2),
            ..LibrarySettings::default()
        };
        let names = titles(&scan(dir.path(), &settings));
        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"one".to_string()));
        assert!(!names.contains(&"two".to_string()));
    }
}
