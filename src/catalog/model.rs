use serde::{Deserialize, Deserializer, Serialize};

/// A playable catalog entry as served by `/api/tracks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub artist: String,
    #[serde(default, alias = "album_id")]
    pub album_id: Option<u64>,
    /// Informational length in seconds; the decoded resource is authoritative.
    #[serde(default)]
    pub duration: f64,
    #[serde(alias = "audio_url")]
    pub audio_url: String,
    #[serde(default, alias = "cover_url")]
    pub cover_url: String,
    #[serde(default, alias = "play_count", deserialize_with = "null_as_zero")]
    pub play_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: u64,
    pub title: String,
    pub artist: String,
    #[serde(default, alias = "cover_url")]
    pub cover_url: String,
    #[serde(default, alias = "release_year")]
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: u64,
    pub title: String,
    #[serde(default, alias = "user_id")]
    pub user_id: Option<u64>,
    #[serde(default, alias = "cover_url")]
    pub cover_url: Option<String>,
}

/// Track fields supplied on insert; the catalog assigns `id` and starts `play_count` at 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    #[serde(default, alias = "album_id")]
    pub album_id: Option<u64>,
    #[serde(default)]
    pub duration: f64,
    #[serde(alias = "audio_url")]
    pub audio_url: String,
    #[serde(default, alias = "cover_url")]
    pub cover_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlbum {
    pub title: String,
    pub artist: String,
    #[serde(default, alias = "cover_url")]
    pub cover_url: String,
    #[serde(default, alias = "release_year")]
    pub release_year: Option<i32>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylist {
    pub title: String,
    #[serde(default, alias = "user_id")]
    pub user_id: Option<u64>,
    #[serde(default, alias = "cover_url")]
    pub cover_url: Option<String>,
}

// The API stores play counts in a nullable column.
fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}
