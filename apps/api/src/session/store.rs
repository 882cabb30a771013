//! In-memory session store. Sessions live only as long as the process —
//! there is deliberately no persistence layer behind the interview flow.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Notify, RwLock};
use uuid::Uuid;

use crate::session::machine::Session;

struct SessionEntry {
    session: Session,
    /// Signalled once per recorded answer; finalization waits on this.
    answered: Arc<Notify>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) -> Uuid {
        let id = session.id;
        self.inner.write().await.insert(
            id,
            SessionEntry {
                session,
                answered: Arc::new(Notify::new()),
            },
        );
        id
    }

    /// Runs `f` against the session under the write lock.
    /// Returns `None` when the session does not exist.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Option<T> {
        let mut guard = self.inner.write().await;
        guard.get_mut(&id).map(|entry| f(&mut entry.session))
    }

    pub async fn snapshot(&self, id: Uuid) -> Option<Session> {
        self.inner.read().await.get(&id).map(|e| e.session.clone())
    }

    pub async fn answered_signal(&self, id: Uuid) -> Option<Arc<Notify>> {
        self.inner.read().await.get(&id).map(|e| e.answered.clone())
    }

    pub async fn notify_answered(&self, id: Uuid) {
        if let Some(signal) = self.answered_signal(id).await {
            signal.notify_one();
        }
    }
}
