// file: src/client/cache.rs
// description: in-memory ttl caches for teams, channels and users
// reference: https://docs.rs/tokio/latest/tokio/sync/struct.RwLock.html

use crate::models::{Channel, Team, User};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

pub struct TtlCache<V> {
    ttl: Duration,
    enabled: bool,
    entries: RwLock<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            ttl,
            enabled,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        if !self.enabled {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        if !self.enabled {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.insert(key.into(), (Instant::now(), value));
    }

    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

pub(crate) const ALL_TEAMS_KEY: &str = "all_teams";

/// Caches owned by one client
pub struct ClientCache {
    pub teams: TtlCache<Vec<Team>>,
    /// keyed by team id
    pub channel_lists: TtlCache<Vec<Channel>>,
    /// keyed by channel id
    pub channels: TtlCache<Channel>,
    /// keyed by user id
    pub users: TtlCache<User>,
}

impl ClientCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            teams: TtlCache::new(ttl, enabled),
            channel_lists: TtlCache::new(ttl, enabled),
            channels: TtlCache::new(ttl, enabled),
            users: TtlCache::new(ttl, enabled),
        }
    }

    /// Entries held across all caches, expired ones included.
    pub async fn len(&self) -> usize {
        self.teams.len().await
            + self.channel_lists.len().await
            + self.channels.len().await
            + self.users.len().await
    }

    pub async fn clear(&self) {
        self.teams.clear().await;
        self.channel_lists.clear().await;
        self.channels.clear().await;
        self.users.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_after_insert() {
        let cache = TtlCache::new(Duration::from_secs(60), true);
        cache.insert("k", 7u32).await;
        assert_eq!(cache.get("k").await, Some(7));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_expired_entries_miss() {
        let cache = TtlCache::new(Duration::from_millis(20), true);
        cache.insert("k", "v".to_string()).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_disabled_cache_stores_nothing() {
        let cache = TtlCache::new(Duration::from_secs(60), false);
        cache.insert("k", 1u8).await;
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let cache = ClientCache::new(Duration::from_secs(60), true);
        cache.users.insert("u1", User::default()).await;
        cache.users.insert("u2", User::default()).await;
        cache.teams.insert(ALL_TEAMS_KEY, vec![]).await;

        cache.users.remove("u1").await;
        assert!(cache.users.get("u1").await.is_none());
        assert!(cache.users.get("u2").await.is_some());
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
