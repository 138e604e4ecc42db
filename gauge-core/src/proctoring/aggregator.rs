//! Risk aggregation over ingested monitoring events
//!
//! Every ingested event triggers a synchronous recompute from the full
//! event set of its session. The per-session event log has its own lock, so
//! concurrent monitors on one session serialize while different sessions
//! stay independent.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SessionError;
use crate::events::{EventBus, GaugeEvent};
use crate::session::MemorySessionStore;

use super::types::{ProctoringEvent, RiskSummary, Severity, SignalKind, compute_risk};

/// Errors raised by event ingestion and review
#[derive(Debug, Error)]
pub enum ProctoringError {
    #[error("proctoring event not found: {0}")]
    EventNotFound(u64),

    #[error("event details must not be empty")]
    EmptyDetails,

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Ingests monitoring events and keeps session risk state current
pub struct RiskAggregator {
    /// Per-session append-only event logs
    logs: RwLock<HashMap<Uuid, Arc<Mutex<Vec<ProctoringEvent>>>>>,
    /// Event id to owning session, for reviewer resolution
    index: RwLock<HashMap<u64, Uuid>>,
    next_id: AtomicU64,
    sessions: Arc<MemorySessionStore>,
    bus: Arc<dyn EventBus>,
}

impl RiskAggregator {
    pub fn new(sessions: Arc<MemorySessionStore>, bus: Arc<dyn EventBus>) -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
            index: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            sessions,
            bus,
        }
    }

    /// Append a monitoring event and synchronously recompute the session's
    /// risk level and suspicious event count.
    pub async fn ingest(
        &self,
        session_id: Uuid,
        kind: SignalKind,
        severity: Severity,
        details: impl Into<String>,
    ) -> Result<RiskSummary, ProctoringError> {
        let details = details.into();
        if details.trim().is_empty() {
            return Err(ProctoringError::EmptyDetails);
        }

        // Reject unknown sessions before touching the log
        self.sessions.snapshot(session_id).await?;

        let log = {
            let mut logs = self.logs.write().await;
            logs.entry(session_id)
                .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
                .clone()
        };

        // Serialize ingestion per session: append and recompute against a
        // consistent snapshot of the full event set
        let mut events = log.lock().await;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        events.push(ProctoringEvent {
            id,
            session_id,
            kind,
            severity,
            details,
            created_at: Utc::now(),
            resolved: false,
            reviewer: None,
            notes: None,
        });
        self.index.write().await.insert(id, session_id);

        let summary = compute_risk(&events);
        let updated = self
            .sessions
            .with_session(session_id, |record| {
                let previous = record.session.risk_level;
                record.session.risk_level = summary.risk_level;
                record.session.suspicious_event_count = summary.suspicious_event_count;
                previous
            })
            .await;
        let previous_level = match updated {
            Ok(previous) => previous,
            Err(e) => {
                // Keep log and session consistent: drop the event we just
                // appended and surface the failure
                events.pop();
                self.index.write().await.remove(&id);
                return Err(e.into());
            }
        };
        drop(events);

        debug!(
            session = %session_id,
            kind = kind.as_str(),
            severity = severity.as_str(),
            "proctoring event ingested"
        );
        self.bus
            .publish(GaugeEvent::ProctoringIngested {
                session_id,
                severity,
            })
            .await;

        if summary.risk_level != previous_level {
            info!(
                session = %session_id,
                level = summary.risk_level.as_str(),
                "session risk level changed"
            );
            self.bus
                .publish(GaugeEvent::RiskLevelChanged {
                    session_id,
                    level: summary.risk_level,
                    suspicious_event_count: summary.suspicious_event_count,
                })
                .await;
        }

        Ok(summary)
    }

    /// Mark an event reviewed. Audit-only: the session's risk level still
    /// reflects the full historical event set.
    pub async fn resolve(
        &self,
        event_id: u64,
        reviewer: impl Into<String>,
        notes: impl Into<String>,
    ) -> Result<(), ProctoringError> {
        let session_id = self
            .index
            .read()
            .await
            .get(&event_id)
            .copied()
            .ok_or(ProctoringError::EventNotFound(event_id))?;

        let log = self
            .logs
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(ProctoringError::EventNotFound(event_id))?;

        let mut events = log.lock().await;
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(ProctoringError::EventNotFound(event_id))?;
        event.resolved = true;
        event.reviewer = Some(reviewer.into());
        event.notes = Some(notes.into());
        Ok(())
    }

    /// Full event history of a session, for reviewer audit views
    pub async fn events_for(&self, session_id: Uuid) -> Vec<ProctoringEvent> {
        match self.logs.read().await.get(&session_id) {
            Some(log) => log.lock().await.clone(),
            None => Vec::new(),
        }
    }
}
