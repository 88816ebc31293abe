//! Forza Artwork - cover art resolution
//!
//! Resolves a `(title, artist)` pair to an image URL by walking a chain of
//! art search queries, filtering out inappropriate candidates, and finally
//! generating a deterministic gradient image when nothing acceptable is
//! found.
//!
//! # Features
//!
//! - Per-key memoization for the whole session
//! - Request coalescing: concurrent lookups for one key share one resolution
//! - Bounded wait on every external call
//! - Base64 SVG data URIs for generated fallbacks
//!
//! # Example
//!
//! ```no_run
//! use forza_artwork::{ArtResolver, ArtworkConfig};
//!
//! # async fn example(search: std::sync::Arc<dyn forza_core::ArtSearch>) {
//! let resolver = ArtResolver::new(search, ArtworkConfig::default());
//! let url = resolver.resolve("Kerosene", "Crystal Castles").await;
//! println!("art: {url}");
//! # }
//! ```

mod error;
mod fallback;
mod filter;
mod resolver;
mod types;

// Re-export public API
pub use error::{ArtworkError, Result};
pub use fallback::{gradient_hues, gradient_image, placeholder_image, title_hash};
pub use filter::{ContentFilter, Rejection, DEFAULT_DENYLIST};
pub use resolver::ArtResolver;
pub use types::{ArtSource, ArtworkConfig, Resolution, SearchStep};
