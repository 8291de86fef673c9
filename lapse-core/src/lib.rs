//! # Lapse Core
//!
//! An in-process key-value store with per-entry TTL (time-to-live) support.
//!
//! ## Features
//!
//! - Thread-safe storage behind a single reader/writer lock
//! - Generic values: the store never inspects what it holds
//! - Optional TTL per entry, replaced wholesale on overwrite
//! - Automatic expiration on read (lazy removal)
//! - Background reaper per store instance, stopped by `close` or drop
//!
//! ## Example
//!
//! ```rust,no_run
//! use lapse_core::{Store, StoreConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Create store with default config (1 second sweep interval)
//!     let store: Store<String> = Store::new();
//!
//!     // Or with a custom sweep interval
//!     let config = StoreConfig::default()
//!         .with_sweep_interval(Duration::from_millis(500));
//!     let store: Store<String> = Store::with_config(config);
//!
//!     // Store a value with a 60 second TTL, and one that never expires
//!     store.set("user:123", "John Doe".to_string(), Some(Duration::from_secs(60)));
//!     store.set("motd", "welcome".to_string(), None);
//!
//!     if let Some(value) = store.get("user:123") {
//!         println!("User: {}", value);
//!     }
//!
//!     store.delete("user:123");
//!
//!     // Stop the background reaper
//!     store.close();
//! }
//! ```

mod config;
mod entry;
mod error;
mod reaper;
mod store;

pub use config::{StoreConfig, DEFAULT_SWEEP_INTERVAL, SWEEP_INTERVAL_ENV};
pub use entry::Entry;
pub use error::{ConfigError, StoreError};
pub use store::Store;
