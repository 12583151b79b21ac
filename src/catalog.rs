//! Albums, tracks and playlists, and the providers that serve them.
//!
//! Three providers share the [`DataProvider`] trait: an in-memory catalog
//! (seeded demo data or a TOML file), a scanned local library, and the REST API.

mod format;
mod memory;
mod model;
mod provider;
mod remote;
mod scan;
mod seed;

pub use format::{format_play_count, format_time};
pub use memory::MemoryCatalog;
#[cfg(test)]
pub use model::NewPlaylist;
pub use model::{Album, NewAlbum, NewTrack, Playlist, Track};
pub use provider::{CatalogError, DataProvider};
pub use remote::RestCatalog;
pub use scan::scan;

#[cfg(test)]
mod tests;
