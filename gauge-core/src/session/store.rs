//! In-memory session storage with per-session exclusivity
//!
//! Every session row lives behind its own `Mutex`, so `start`,
//! `submit_answer`, `complete` and the expiry sweep serialize against each
//! other for one session without blocking unrelated sessions. Lock
//! acquisition is bounded; hitting the bound surfaces
//! [`SessionError::Contention`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::catalog::Question;
use crate::error::SessionError;

use super::types::{Answer, CompletionSummary, Session, SessionStatus};

/// A session row together with its answers
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session: Session,
    answers: HashMap<i64, Answer>,
}

impl SessionRecord {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            answers: HashMap::new(),
        }
    }

    /// Answers recorded so far
    pub fn answers(&self) -> impl Iterator<Item = &Answer> {
        self.answers.values()
    }

    pub fn answer_for(&self, question_id: i64) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    pub fn correct_count(&self) -> u32 {
        self.answers.values().filter(|a| a.is_correct).count() as u32
    }

    /// Record or overwrite an answer. Valid only while `started` and before
    /// the deadline; a post-deadline call transitions the session to
    /// `expired` and records nothing.
    pub fn submit_answer(
        &mut self,
        question: &Question,
        option_index: u8,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        if !(1..=4).contains(&option_index) {
            return Err(SessionError::InvalidOption(option_index));
        }
        if self.session.status != SessionStatus::Started {
            return Err(SessionError::InvalidState {
                expected: SessionStatus::Started.as_str().to_string(),
                actual: self.session.status.as_str().to_string(),
            });
        }
        if self.session.is_expired_at(now) {
            self.session.mark_expired();
            return Err(SessionError::DeadlinePassed);
        }

        let is_correct = question.is_correct(option_index);
        self.answers.insert(
            question.id,
            Answer {
                question_id: question.id,
                option_index,
                is_correct,
                submitted_at: now,
            },
        );
        Ok(is_correct)
    }

    /// Complete the attempt and compute the final score. Valid only from
    /// `started` and only if the deadline has not passed at the instant of
    /// the call; a late call transitions to `expired` instead.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<CompletionSummary, SessionError> {
        if self.session.status != SessionStatus::Started {
            return Err(SessionError::InvalidState {
                expected: SessionStatus::Started.as_str().to_string(),
                actual: self.session.status.as_str().to_string(),
            });
        }
        if self.session.is_expired_at(now) {
            self.session.mark_expired();
            return Err(SessionError::DeadlinePassed);
        }

        let summary = CompletionSummary::from_correct_count(self.correct_count());
        self.session.status = SessionStatus::Completed;
        self.session.completed_at = Some(now);
        self.session.score = Some(summary.score);
        Ok(summary)
    }
}

/// In-memory session store
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionRecord>>>>,
    lock_timeout: Duration,
}

impl MemorySessionStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            lock_timeout,
        }
    }

    /// Insert a freshly created session
    pub async fn insert(&self, session: Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(SessionError::AlreadyExists(session.id));
        }
        sessions.insert(session.id, Arc::new(Mutex::new(SessionRecord::new(session))));
        Ok(())
    }

    /// Run `f` inside the session's exclusive critical section.
    ///
    /// The per-session lock is what racing pairs (complete vs sweep, submit
    /// vs expiry) serialize on. Acquisition is bounded by the store's lock
    /// timeout.
    pub async fn with_session<F, R>(&self, id: Uuid, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut SessionRecord) -> R,
    {
        let entry = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))?;

        let mut record = tokio::time::timeout(self.lock_timeout, entry.lock())
            .await
            .map_err(|_| SessionError::Contention(id))?;
        Ok(f(&mut record))
    }

    /// Read-only snapshot of the session row
    pub async fn snapshot(&self, id: Uuid) -> Result<Session, SessionError> {
        self.with_session(id, |record| record.session.clone()).await
    }

    /// All known session ids (the sweep scans these)
    pub async fn session_ids(&self) -> Vec<Uuid> {
        self.sessions.read().await.keys().copied().collect()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
