// src/quiz/store.rs

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use uuid::Uuid;

use super::session::QuizSession;
use crate::{config::SESSION_IDLE_TTL_SECS, error::AppError};

/// A live session and the context needed to finish it.
#[derive(Debug)]
pub struct StoredSession {
    pub owner: String,
    pub course_id: String,
    pub course_title: String,
    pub session: QuizSession,
}

struct Slot {
    entry: StoredSession,
    last_access: Instant,
}

impl Slot {
    fn is_idle(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() >= ttl
    }
}

/// In-memory registry of open quiz sessions.
///
/// Each learner has at most one session per course: opening a new one (or
/// retaking) drops the previous one, like a page that unmounts. Sessions
/// untouched for `idle_ttl` are dropped; a certificate can still be issued
/// later from the stored attempt.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Slot>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(Duration::from_secs(SESSION_IDLE_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            idle_ttl,
        }
    }

    pub async fn insert(&self, id: Uuid, entry: StoredSession) {
        let mut sessions = self.inner.lock().await;
        cleanup_idle(&mut sessions, self.idle_ttl);
        sessions.retain(|_, slot| {
            !(slot.entry.owner == entry.owner && slot.entry.course_id == entry.course_id)
        });
        sessions.insert(
            id,
            Slot {
                entry,
                last_access: Instant::now(),
            },
        );
    }

    /// Runs `f` on the session if it exists and belongs to `owner`.
    /// Someone else's session, or one left idle too long, is reported as missing.
    pub async fn with_session<T, F>(&self, id: Uuid, owner: &str, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut StoredSession) -> Result<T, AppError>,
    {
        let mut sessions = self.inner.lock().await;
        if sessions.get(&id).is_some_and(|slot| slot.is_idle(self.idle_ttl)) {
            sessions.remove(&id);
        }
        match sessions.get_mut(&id) {
            Some(slot) if slot.entry.owner == owner => {
                slot.last_access = Instant::now();
                f(&mut slot.entry)
            }
            _ => Err(AppError::NotFound("Quiz session not found".to_string())),
        }
    }

    pub async fn remove(&self, id: Uuid, owner: &str) -> Option<StoredSession> {
        let mut sessions = self.inner.lock().await;
        match sessions.get(&id) {
            Some(slot) if slot.entry.owner == owner => sessions.remove(&id).map(|slot| slot.entry),
            _ => None,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

fn cleanup_idle(sessions: &mut HashMap<Uuid, Slot>, ttl: Duration) {
    let before = sessions.len();
    sessions.retain(|_, slot| !slot.is_idle(ttl));
    if sessions.len() < before {
        tracing::debug!("Dropped {} idle quiz session(s)", before - sessions.len());
    }
}
