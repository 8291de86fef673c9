use std::time::Duration;
use tokio::time::Instant;

/// A stored value with its optional expiration time
#[derive(Debug, Clone)]
pub struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    /// Creates a new entry. `None` means the entry never expires.
    pub fn new(value: V, expires_at: Option<Instant>) -> Self {
        Self { value, expires_at }
    }

    /// Creates an entry that expires `ttl` after `now`.
    ///
    /// A zero TTL, or one too large to represent as an instant, yields an
    /// entry that never expires.
    pub fn with_ttl(value: V, ttl: Option<Duration>, now: Instant) -> Self {
        let expires_at = ttl
            .filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| now.checked_add(ttl));
        Self::new(value, expires_at)
    }

    /// Returns a reference to the stored value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry, returning the stored value
    pub fn into_value(self) -> V {
        self.value
    }

    /// Returns the expiration time, if any
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Checks whether this entry has expired at `now`.
    ///
    /// Expiry is inclusive: an entry whose deadline equals `now` is expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }

    /// Checks whether this entry has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Time left before expiry at `now`. `None` for entries that never expire.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
