use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::model::{Album, Playlist, Track};
use super::provider::{CatalogError, DataProvider};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Catalog served over the `/api` REST surface.
#[derive(Debug, Clone)]
pub struct RestCatalog {
    client: Client,
    base_url: String,
}

impl RestCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let resp = self.client.get(self.endpoint(path)).send()?;
        Ok(check_status(resp)?.json()?)
    }

    fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CatalogError> {
        let resp = self.client.get(self.endpoint(path)).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check_status(resp)?.json()?))
    }
}

/// Turn a non-2xx response into `CatalogError::Status`, keeping the server's message.
fn check_status(resp: Response) -> Result<Response, CatalogError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .text()
        .ok()
        .and_then(|body| {
            serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .ok()
                .or_else(|| Some(body).filter(|b| !b.trim().is_empty()))
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
    log::warn!("catalog request failed: {status} {message}");
    Err(CatalogError::Status {
        status: status.as_u16(),
        message,
    })
}

impl DataProvider for RestCatalog {
    fn list_albums(&self) -> Result<Vec<Album>, CatalogError> {
        self.get_json("/api/albums")
    }

    fn get_album(&self, id: u64) -> Result<Option<Album>, CatalogError> {
        self.get_optional(&format!("/api/albums/{id}"))
    }

    fn list_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        self.get_json("/api/tracks")
    }

    fn get_track(&self, id: u64) -> Result<Option<Track>, CatalogError> {
        self.get_optional(&format!("/api/tracks/{id}"))
    }

    fn tracks_by_album(&self, album_id: u64) -> Result<Vec<Track>, CatalogError> {
        self.get_json(&format!("/api/albums/{album_id}/tracks"))
    }

    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        // The server rejects an empty query with 400.
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let resp = self
            .client
            .get(self.endpoint("/api/search"))
            .query(&[("q", query)])
            .send()?;
        Ok(check_status(resp)?.json()?)
    }

    fn increment_play_count(&self, track_id: u64) -> Result<(), CatalogError> {
        let resp = self
            .client
            .post(self.endpoint(&format!("/api/tracks/{track_id}/play")))
            .send()?;
        check_status(resp)?;
        Ok(())
    }

    fn list_playlists(&self) -> Result<Vec<Playlist>, CatalogError> {
        self.get_json("/api/playlists")
    }
}
