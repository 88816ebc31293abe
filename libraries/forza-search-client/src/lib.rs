//! Forza Radio Search Client
//!
//! HTTP client for the catalog search service used to find cover art.
//!
//! # Features
//!
//! - **Authentication**: client-credentials token exchange, cached in memory
//!   and persisted through a `PreferenceStore` with its expiry
//! - **Track search**: by title and artist, or by title alone
//! - **Artist search**: by artist name
//!
//! # Example
//!
//! ```ignore
//! use forza_core::{ArtSearch, TrackQuery};
//! use forza_search_client::{SearchClient, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig::with_credentials("client-id", "client-secret");
//!     let client = SearchClient::new(config)?;
//!
//!     let query = TrackQuery::TrackAndArtist {
//!         title: "Kerosene".into(),
//!         artist: "Crystal Castles".into(),
//!     };
//!     for candidate in client.search_tracks(&query).await? {
//!         println!("{} ({:?})", candidate.name, candidate.best_image());
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
mod types;

pub use auth::{TOKEN_EXPIRY_KEY, TOKEN_KEY};
pub use client::SearchClient;
pub use error::{Result, SearchClientError};
pub use types::SearchConfig;
