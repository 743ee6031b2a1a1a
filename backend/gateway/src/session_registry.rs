//! Live autofill sessions, keyed by session id.
//!
//! Sessions idle longer than the configured TTL are evicted, both when a new
//! session registers and from a periodic sweep while the server runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use lcforge_autofill::AutofillSession;

pub type SessionId = String;

const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<AutofillSession>>>>,
    /// `None` keeps sessions until they are deleted.
    ttl: Option<Duration>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub async fn register(&self, session: Arc<AutofillSession>) {
        self.prune_idle_at(Utc::now()).await;
        let mut w = self.sessions.write().await;
        w.insert(session.id().to_string(), session);
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<AutofillSession>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Drop a session, cancelling whatever it has in flight.
    pub async fn unregister(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(session) => {
                session.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Evict sessions whose last change is older than the TTL as of `now`.
    /// Sessions with an attempt in flight are kept. Returns how many went.
    pub async fn prune_idle_at(&self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.ttl.and_then(|t| chrono::Duration::from_std(t).ok()) else {
            return 0;
        };
        let mut w = self.sessions.write().await;
        let before = w.len();
        w.retain(|id, session| {
            let form = session.snapshot();
            let keep = form.state.is_in_flight() || now - form.updated_at <= ttl;
            if !keep {
                debug!(session_id = %id, "Evicting idle session");
            }
            keep
        });
        let evicted = before - w.len();
        if evicted > 0 {
            info!(evicted, remaining = w.len(), "Idle sessions evicted");
        }
        evicted
    }

    /// Periodically evict idle sessions. Nothing is spawned without a TTL.
    pub fn spawn_sweeper(&self) -> Option<JoinHandle<()>> {
        let ttl = self.ttl?;
        let period = ttl.min(MAX_SWEEP_PERIOD).max(Duration::from_secs(1));
        let registry = self.clone();
        Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.tick().await;
            loop {
                tick.tick().await;
                registry.prune_idle_at(Utc::now()).await;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcforge_autofill::StageTimeouts;
    use lcforge_core::FieldName;
    use lcforge_mapper::{FieldMapper, MapperSettings, MockProvider};
    use lcforge_understanding::StaticExtractor;

    fn session(id: &str) -> Arc<AutofillSession> {
        let mapper = FieldMapper::new(Arc::new(MockProvider::new("mock")), MapperSettings::default());
        Arc::new(AutofillSession::with_id(
            id,
            Arc::new(StaticExtractor::new("Amount: 5 USD")),
            Arc::new(mapper),
            StageTimeouts::default(),
        ))
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_after_ttl() {
        let registry = SessionRegistry::with_ttl(Some(Duration::from_secs(600)));
        registry.register(session("a")).await;
        registry.register(session("b")).await;
        assert_eq!(registry.len().await, 2);

        assert_eq!(registry.prune_idle_at(Utc::now()).await, 0);
        let later = Utc::now() + chrono::Duration::seconds(601);
        assert_eq!(registry.prune_idle_at(later).await, 2);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn recent_activity_keeps_a_session() {
        let registry = SessionRegistry::with_ttl(Some(Duration::from_secs(600)));
        registry.register(session("old")).await;
        let fresh = session("fresh");
        registry.register(fresh.clone()).await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(fresh.set_field(FieldName::Amount, "1 USD"));
        let check_at = fresh.snapshot().updated_at + chrono::Duration::seconds(600);

        assert_eq!(registry.prune_idle_at(check_at).await, 1);
        assert!(registry.get("old").await.is_none());
        assert!(registry.get("fresh").await.is_some());
    }

    #[tokio::test]
    async fn no_ttl_keeps_everything() {
        let registry = SessionRegistry::new();
        registry.register(session("a")).await;
        let much_later = Utc::now() + chrono::Duration::days(30);
        assert_eq!(registry.prune_idle_at(much_later).await, 0);
        assert_eq!(registry.len().await, 1);
        assert!(registry.spawn_sweeper().is_none());
    }
}
