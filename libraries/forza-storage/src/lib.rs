//! Forza Radio Storage
//!
//! Preference persistence behind the `PreferenceStore` trait: a durable
//! redb-backed store for real sessions and an in-memory store for tests and
//! ephemeral runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use forza_core::PreferenceStore;
//! use forza_storage::RedbPreferences;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let prefs = RedbPreferences::open("forza-radio.redb")?;
//! prefs.set("forza_radio_volume", "0.6")?;
//! assert_eq!(prefs.get("forza_radio_volume")?.as_deref(), Some("0.6"));
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod redb_store;

pub use error::{Result, StorageError};
pub use memory::MemoryPreferences;
pub use redb_store::RedbPreferences;
