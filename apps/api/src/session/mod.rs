//! Session result slot: remembers the latest improved script per session.
//!
//! Created on the first successful generation, overwritten by the next one,
//! cleared when the session ends. Failed generations never touch it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use redis::Client as RedisClient;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

pub mod handlers;

const KEY_PREFIX: &str = "scriptsmith:session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[derive(Debug, Clone)]
pub struct Slot {
    script: String,
    expires_at: Instant,
}

/// Per-session storage. Both backends expire a slot `ttl` after its last write.
#[derive(Clone)]
pub enum SessionStore {
    /// Process-local slots; lost on restart.
    Memory {
        slots: Arc<RwLock<HashMap<String, Slot>>>,
        ttl: Duration,
    },
    Redis { client: RedisClient, ttl_secs: u64 },
}

impl SessionStore {
    pub fn in_memory(ttl_secs: u64) -> Self {
        SessionStore::Memory {
            slots: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    pub fn redis(client: RedisClient, ttl_secs: u64) -> Self {
        SessionStore::Redis { client, ttl_secs }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            SessionStore::Memory { .. } => "memory",
            SessionStore::Redis { .. } => "redis",
        }
    }

    pub async fn latest_result(&self, session_id: &str) -> Result<Option<String>, SessionError> {
        match self {
            SessionStore::Memory { slots, .. } => {
                let mut slots = slots.write().await;
                evict_expired(&mut slots);
                Ok(slots.get(session_id).map(|slot| slot.script.clone()))
            }
            SessionStore::Redis { client, .. } => {
                let mut con = client.get_multiplexed_async_connection().await?;
                let value = redis::cmd("GET")
                    .arg(slot_key(session_id))
                    .query_async::<_, Option<String>>(&mut con)
                    .await?;
                Ok(value)
            }
        }
    }

    pub async fn store_result(&self, session_id: &str, script: &str) -> Result<(), SessionError> {
        match self {
            SessionStore::Memory { slots, ttl } => {
                let mut slots = slots.write().await;
                evict_expired(&mut slots);
                slots.insert(
                    session_id.to_string(),
                    Slot {
                        script: script.to_string(),
                        expires_at: Instant::now() + *ttl,
                    },
                );
            }
            SessionStore::Redis { client, ttl_secs } => {
                let mut con = client.get_multiplexed_async_connection().await?;
                redis::cmd("SET")
                    .arg(slot_key(session_id))
                    .arg(script)
                    .arg("EX")
                    .arg(*ttl_secs)
                    .query_async::<_, ()>(&mut con)
                    .await?;
            }
        }
        debug!("Stored result for session {session_id}");
        Ok(())
    }

    /// Ends the session. Returns whether a result was held.
    pub async fn clear(&self, session_id: &str) -> Result<bool, SessionError> {
        match self {
            SessionStore::Memory { slots, .. } => {
                let mut slots = slots.write().await;
                evict_expired(&mut slots);
                Ok(slots.remove(session_id).is_some())
            }
            SessionStore::Redis { client, .. } => {
                let mut con = client.get_multiplexed_async_connection().await?;
                let removed = redis::cmd("DEL")
                    .arg(slot_key(session_id))
                    .query_async::<_, i64>(&mut con)
                    .await?;
                Ok(removed > 0)
            }
        }
    }
}

fn evict_expired(slots: &mut HashMap<String, Slot>) {
    let now = Instant::now();
    slots.retain(|_, slot| slot.expires_at > now);
}

fn slot_key(session_id: &str) -> String {
    format!("{KEY_PREFIX}:{session_id}:enhanced_script")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn held_slots(sessions: &SessionStore) -> usize {
        match sessions {
            SessionStore::Memory { slots, .. } => slots.read().await.len(),
            SessionStore::Redis { .. } => unreachable!("memory backend only"),
        }
    }

    #[tokio::test]
    async fn test_slot_lifecycle() {
        let sessions = SessionStore::in_memory(60);
        assert_eq!(sessions.latest_result("s1").await.unwrap(), None);

        sessions.store_result("s1", "first").await.unwrap();
        sessions.store_result("s1", "second").await.unwrap();
        assert_eq!(
            sessions.latest_result("s1").await.unwrap().as_deref(),
            Some("second")
        );

        assert!(sessions.clear("s1").await.unwrap());
        assert!(!sessions.clear("s1").await.unwrap());
        assert_eq!(sessions.latest_result("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_slots() {
        let sessions = SessionStore::in_memory(60);
        sessions.store_result("a", "for a").await.unwrap();
        assert_eq!(sessions.latest_result("b").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_slot_expires_after_ttl() {
        let sessions = SessionStore::in_memory(60);
        sessions.store_result("s1", "draft").await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(
            sessions.latest_result("s1").await.unwrap().as_deref(),
            Some("draft")
        );

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(sessions.latest_result("s1").await.unwrap(), None);
        assert_eq!(held_slots(&sessions).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_slots_are_evicted_on_insert() {
        let sessions = SessionStore::in_memory(60);
        for i in 0..1000 {
            sessions
                .store_result(&format!("abandoned-{i}"), "text")
                .await
                .unwrap();
        }
        assert_eq!(held_slots(&sessions).await, 1000);

        tokio::time::advance(Duration::from_secs(61)).await;
        sessions.store_result("fresh", "text").await.unwrap();
        assert_eq!(held_slots(&sessions).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_extends_expiry() {
        let sessions = SessionStore::in_memory(60);
        sessions.store_result("s1", "first").await.unwrap();
        tokio::time::advance(Duration::from_secs(40)).await;
        sessions.store_result("s1", "second").await.unwrap();
        tokio::time::advance(Duration::from_secs(40)).await;

        assert_eq!(
            sessions.latest_result("s1").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_slot_key_is_namespaced() {
        assert_eq!(slot_key("abc"), "scriptsmith:session:abc:enhanced_script");
    }

    /// Needs a reachable Redis; skipped unless `REDIS_URL` is set.
    #[tokio::test]
    async fn test_redis_slot_lifecycle() {
        let Ok(url) = std::env::var("REDIS_URL") else {
            eprintln!("REDIS_URL not set, skipping Redis session test");
            return;
        };
        let client = RedisClient::open(url.as_str()).unwrap();
        let sessions = SessionStore::redis(client.clone(), 120);
        let session_id = format!("test-{}", uuid::Uuid::new_v4());

        assert_eq!(sessions.backend_name(), "redis");
        assert_eq!(sessions.latest_result(&session_id).await.unwrap(), None);

        sessions.store_result(&session_id, "first").await.unwrap();
        sessions.store_result(&session_id, "second").await.unwrap();
        assert_eq!(
            sessions.latest_result(&session_id).await.unwrap().as_deref(),
            Some("second")
        );

        let mut con = client.get_multiplexed_async_connection().await.unwrap();
        let ttl: i64 = redis::cmd("TTL")
            .arg(slot_key(&session_id))
            .query_async(&mut con)
            .await
            .unwrap();
        assert!(ttl > 0 && ttl <= 120, "unexpected ttl {ttl}");

        assert!(sessions.clear(&session_id).await.unwrap());
        assert!(!sessions.clear(&session_id).await.unwrap());
        assert_eq!(sessions.latest_result(&session_id).await.unwrap(), None);
    }
}
