use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::config::StoreConfig;
use crate::entry::Entry;
use crate::error::StoreError;
use crate::reaper;

/// State shared between store handles and the reaper
pub(crate) struct Shared<V> {
    /// Every read and write of the table goes through this lock
    table: RwLock<HashMap<String, Entry<V>>>,
    /// Flipped to `true` once to stop the reaper
    shutdown_tx: watch::Sender<bool>,
}

impl<V> Shared<V> {
    pub(crate) fn with_shutdown() -> (Self, watch::Receiver<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let shared = Self {
            table: RwLock::new(HashMap::new()),
            shutdown_tx,
        };
        (shared, shutdown_rx)
    }

    pub(crate) fn insert(&self, key: String, value: V, ttl: Option<Duration>) {
        let entry = Entry::with_ttl(value, ttl, Instant::now());
        // The replaced entry is dropped after the lock is released.
        let _previous = self.table.write().insert(key, entry);
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.table.read().keys().cloned().collect()
    }

    /// Removes `key` only if it is still present and expired at `now`.
    ///
    /// Between a reader seeing an expired entry and taking the write lock,
    /// another caller may have replaced it with a live one; that entry stays.
    fn remove_if_expired(&self, key: &str, now: Instant) -> bool {
        let mut table = self.table.write();
        if table.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
            table.remove(key);
            true
        } else {
            false
        }
    }

    /// Two-phase sweep: collect expired keys under the read lock, then
    /// delete the ones still expired under the write lock.
    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .table
            .read()
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        if expired.is_empty() {
            return 0;
        }

        let mut table = self.table.write();
        let mut removed = 0;
        for key in &expired {
            // Delete if present: the key may have been removed or refreshed
            // since the scan.
            if table.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
                table.remove(key);
                removed += 1;
            }
        }
        removed
    }

    /// Returns `true` if this call flipped the signal
    pub(crate) fn signal_shutdown(&self) -> bool {
        !self.shutdown_tx.send_replace(true)
    }

    fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}

/// Thread-safe in-memory key-value store with per-entry TTL
///
/// The table is a `HashMap` behind a single reader/writer lock: lookups run
/// concurrently with each other, mutations are exclusive, and every public
/// operation is atomic with respect to the others.
///
/// Expired entries are never returned. [`Store::get`] removes an expired
/// entry as soon as it sees one, and a background reaper sweeps the rest on
/// a fixed interval so entries nobody reads again do not pile up.
///
/// Handles are cheap to clone and share the same table and reaper. The
/// reaper stops on [`Store::close`] or when the last handle is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use lapse_core::Store;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let store: Store<String> = Store::new();
///
///     store.set("session:42", "alice".to_string(), Some(Duration::from_secs(300)));
///     store.set("motd", "hello".to_string(), None);
///
///     assert_eq!(store.get("session:42").as_deref(), Some("alice"));
///
///     store.close();
/// }
/// ```
pub struct Store<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for Store<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V> Store<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new store with the default one second sweep interval
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store requires
    /// a runtime to spawn its reaper. Use [`Store::try_with_config`] to get an
    /// error instead.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a new store with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context or if the
    /// configuration is invalid.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use lapse_core::{Store, StoreConfig};
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let config = StoreConfig::default()
    ///         .with_sweep_interval(Duration::from_millis(250));
    ///     let store: Store<u64> = Store::with_config(config);
    /// }
    /// ```
    pub fn with_config(config: StoreConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(store) => store,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a new store, reporting a missing runtime or an invalid
    /// configuration as an error
    pub fn try_with_config(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| StoreError::NoRuntime)?;

        let (shared, shutdown_rx) = Shared::with_shutdown();
        let shared = Arc::new(shared);

        reaper::spawn(
            &runtime,
            Arc::downgrade(&shared),
            config.sweep_interval,
            shutdown_rx,
        );

        Ok(Self { shared })
    }
}

impl<V: Clone> Store<V> {
    /// Stores a value under `key`, replacing any previous entry
    ///
    /// # TTL Semantics
    ///
    /// - `None` or a zero TTL means the entry **never expires**.
    /// - Otherwise the entry expires `ttl` from now. Expiry is inclusive: a
    ///   read at exactly the deadline misses.
    /// - Overwriting a key replaces its TTL too. Setting again with a new TTL
    ///   extends an entry; setting with `None` makes it permanent.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.shared.insert(key.into(), value, ttl);
    }

    /// Retrieves a value by key
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    /// Expired entries are removed before returning.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let table = self.shared.table.read();
            match table.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired_at(now) => return Some(entry.value().clone()),
                Some(_) => {}
            }
        }

        self.shared.remove_if_expired(key, now);
        None
    }

    /// Checks if a key exists and is not expired.
    ///
    /// Expired entries are lazily removed when checked.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.ttl(key).is_some()
    }

    /// Returns the remaining lifetime of a live entry
    ///
    /// `Some(None)` means the entry never expires. `None` means the key is
    /// absent or expired; expired entries are removed.
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        {
            let table = self.shared.table.read();
            match table.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired_at(now) => return Some(entry.remaining_at(now)),
                Some(_) => {}
            }
        }

        self.shared.remove_if_expired(key, now);
        None
    }

    /// Deletes a key from the store
    ///
    /// Returns `true` if the key existed (regardless of expiration), `false`
    /// otherwise. Deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.shared.table.write().remove(key);
        removed.is_some()
    }

    /// Removes every entry at once
    ///
    /// Concurrent readers see either the full table or the empty one, never
    /// a partially cleared table. Returns the number of entries dropped.
    pub fn clear(&self) -> usize {
        let old = std::mem::take(&mut *self.shared.table.write());
        old.len()
    }

    /// Returns every key currently in the table
    ///
    /// Entries whose TTL has passed but that neither a read nor the reaper has
    /// removed yet are still listed. Use [`Store::get`] or
    /// [`Store::contains_key`] for an authoritative liveness check.
    pub fn keys(&self) -> Vec<String> {
        self.shared.keys()
    }

    /// Returns the number of entries in the table (including expired ones
    /// not yet removed)
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.table.read().len()
    }

    /// Returns `true` if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.table.read().is_empty()
    }

    /// Runs one sweep immediately on the calling thread
    ///
    /// Returns the number of entries removed. The reaper does the same on
    /// its own schedule; this is useful after [`Store::close`].
    pub fn purge_expired(&self) -> usize {
        self.shared.purge_expired_at(Instant::now())
    }
}

impl<V> Store<V> {
    /// Stops the background reaper
    ///
    /// Closing is idempotent: the first call returns `true`, later calls do
    /// nothing and return `false`. The table stays usable after closing, but
    /// expired entries are then only removed by reads, deletes or
    /// [`Store::purge_expired`].
    pub fn close(&self) -> bool {
        let stopped = self.shared.signal_shutdown();
        if !stopped {
            debug!("store already closed");
        }
        stopped
    }

    /// Returns `true` once [`Store::close`] has been called on any handle
    pub fn is_closed(&self) -> bool {
        self.shared.is_shut_down()
    }
}

impl<V> Default for Store<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("len", &self.shared.table.read().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
