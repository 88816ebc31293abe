//! Forza Radio Catalog Sources
//!
//! Where tracks come from:
//!
//! - [`ManifestClient`]: a static `songs.json` manifest of
//!   `{title, artist, filename | audioUrl}` entries, used in Sequential and
//!   Shuffled modes
//! - [`ArchiveFeed`]: a remotely curated collection from an Internet Archive
//!   uploader, implementing `FeedProvider` for ExternalFeed (radio) mode

mod archive;
mod error;
mod manifest;

pub use archive::{parse_item_title, ArchiveConfig, ArchiveFeed, SongInfo};
pub use error::{CatalogError, Result};
pub use manifest::{ManifestClient, ManifestConfig};
