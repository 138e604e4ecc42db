//! Assessment operations facade
//!
//! Everything the boundary layer may call lives here. Each operation takes
//! the caller's verified identity and enforces the access rules: assessed
//! users operate only their own sessions, reviewers read across sessions
//! but never submit on someone else's behalf.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assembly::{AssemblyService, Blueprint, MemoryAssignmentStore};
use crate::catalog::MemoryCatalog;
use crate::config::GaugeConfig;
use crate::error::{GaugeError, SessionError};
use crate::events::{EventBus, GaugeEvent};
use crate::identity::Identity;
use crate::proctoring::{ProctoringEvent, RiskAggregator, RiskSummary, Severity, SignalKind};
use crate::session::{
    CompletionSummary, ExpirySweeper, MemorySessionStore, Session, SessionRecord,
};

use super::retry::RetryPolicy;
use super::views::{AnswerView, QuestionView};

/// The assessment core behind the HTTP/RPC boundary
pub struct AssessmentService {
    config: GaugeConfig,
    catalog: Arc<MemoryCatalog>,
    sessions: Arc<MemorySessionStore>,
    assembly: AssemblyService,
    aggregator: RiskAggregator,
    bus: Arc<dyn EventBus>,
}

impl AssessmentService {
    pub fn new(config: GaugeConfig, catalog: Arc<MemoryCatalog>, bus: Arc<dyn EventBus>) -> Self {
        let sessions = Arc::new(MemorySessionStore::new(Duration::from_millis(
            config.store.lock_timeout_ms,
        )));
        let assignments = Arc::new(MemoryAssignmentStore::new());
        let assembly = AssemblyService::new(
            catalog.clone(),
            sessions.clone(),
            assignments,
            bus.clone(),
        );
        let aggregator = RiskAggregator::new(sessions.clone(), bus.clone());

        Self {
            config,
            catalog,
            sessions,
            assembly,
            aggregator,
            bus,
        }
    }

    /// The session store, for wiring auxiliary components
    pub fn sessions(&self) -> Arc<MemorySessionStore> {
        self.sessions.clone()
    }

    /// Build the expiry sweeper configured for this service
    pub fn sweeper(&self) -> ExpirySweeper {
        ExpirySweeper::new(
            self.sessions.clone(),
            self.bus.clone(),
            Duration::from_secs(self.config.sweep.interval_secs),
        )
    }

    /// Create a session bound to the caller and a specialization
    pub async fn create_session(
        &self,
        identity: &Identity,
        specialization_id: i64,
    ) -> Result<Session, GaugeError> {
        // Fail fast on unknown specializations
        self.catalog.competencies_for(specialization_id).await?;

        let session = Session::new(
            identity.subject_id.clone(),
            specialization_id,
            self.config.exam.time_limit_minutes,
        );
        let snapshot = session.clone();
        self.sessions.insert(session).await?;

        info!(
            session = %snapshot.id,
            user = %identity.subject_id,
            specialization = specialization_id,
            "session created"
        );
        self.bus
            .publish(GaugeEvent::SessionCreated {
                session_id: snapshot.id,
                user_id: identity.subject_id.clone(),
            })
            .await;
        Ok(snapshot)
    }

    /// Assemble (or fetch) the session's blueprint
    pub async fn assemble_session(
        &self,
        identity: &Identity,
        session_id: Uuid,
        specialization_id: i64,
    ) -> Result<Blueprint, GaugeError> {
        self.owned_session(identity, session_id).await?;
        Ok(self.assembly.assemble(session_id, specialization_id).await?)
    }

    /// Start the attempt clock; returns the submission deadline
    pub async fn start_session(
        &self,
        identity: &Identity,
        session_id: Uuid,
    ) -> Result<DateTime<Utc>, GaugeError> {
        self.owned_session(identity, session_id).await?;
        // A session without a blueprint has nothing to answer
        self.assembly.blueprint(session_id).await?;

        let deadline = self
            .locked(session_id, |record| record.session.start(Utc::now()))
            .await??;

        info!(session = %session_id, %deadline, "session started");
        self.bus
            .publish(GaugeEvent::SessionStarted {
                session_id,
                deadline,
            })
            .await;
        Ok(deadline)
    }

    /// The canonical 24-question sequence with the caller's answers so far.
    ///
    /// Accessing a session checks expiry lazily; an overdue session is
    /// transitioned here even if nobody else touches it.
    pub async fn get_questions(
        &self,
        identity: &Identity,
        session_id: Uuid,
    ) -> Result<Vec<QuestionView>, GaugeError> {
        self.readable_session(identity, session_id).await?;
        let blueprint = self.assembly.blueprint(session_id).await?;

        let (expired_now, answers) = self
            .locked(session_id, |record| {
                let expired_now = Self::lazy_expire(record);
                let answers: HashMap<i64, AnswerView> = record
                    .answers()
                    .map(|a| {
                        (
                            a.question_id,
                            AnswerView {
                                option_index: a.option_index,
                                is_correct: a.is_correct,
                            },
                        )
                    })
                    .collect();
                (expired_now, answers)
            })
            .await?;
        if expired_now {
            self.bus
                .publish(GaugeEvent::SessionExpired { session_id })
                .await;
        }

        self.build_views(&blueprint, &answers).await
    }

    /// Record (or overwrite) an answer; returns its correctness
    pub async fn submit_answer(
        &self,
        identity: &Identity,
        session_id: Uuid,
        question_id: i64,
        option_index: u8,
    ) -> Result<bool, GaugeError> {
        self.owned_session(identity, session_id).await?;

        let blueprint = self.assembly.blueprint(session_id).await?;
        let question = blueprint
            .entries
            .iter()
            .find(|e| e.question.id == question_id)
            .map(|e| e.question.clone())
            .ok_or(SessionError::UnknownQuestion(question_id))?;

        let result = self
            .locked(session_id, |record| {
                record.submit_answer(&question, option_index, Utc::now())
            })
            .await?;

        match result {
            Ok(is_correct) => {
                self.bus
                    .publish(GaugeEvent::AnswerSubmitted {
                        session_id,
                        question_id,
                    })
                    .await;
                Ok(is_correct)
            }
            Err(SessionError::DeadlinePassed) => {
                // The failed submit performed the lazy expiry transition
                self.bus
                    .publish(GaugeEvent::SessionExpired { session_id })
                    .await;
                Err(SessionError::DeadlinePassed.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Complete the attempt and return the scored summary
    pub async fn complete_session(
        &self,
        identity: &Identity,
        session_id: Uuid,
    ) -> Result<CompletionSummary, GaugeError> {
        self.owned_session(identity, session_id).await?;

        let result = self
            .locked(session_id, |record| record.complete(Utc::now()))
            .await?;

        match result {
            Ok(summary) => {
                info!(session = %session_id, score = summary.score, "session completed");
                self.bus
                    .publish(GaugeEvent::SessionCompleted {
                        session_id,
                        score: summary.score,
                    })
                    .await;
                Ok(summary)
            }
            Err(SessionError::DeadlinePassed) => {
                self.bus
                    .publish(GaugeEvent::SessionExpired { session_id })
                    .await;
                Err(SessionError::DeadlinePassed.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Session row, for the owner or a reviewer
    pub async fn get_session(
        &self,
        identity: &Identity,
        session_id: Uuid,
    ) -> Result<Session, GaugeError> {
        self.readable_session(identity, session_id).await?;

        // Reads count as accesses: an overdue session expires here too
        let (expired_now, session) = self
            .locked(session_id, |record| {
                let expired_now = Self::lazy_expire(record);
                (expired_now, record.session.clone())
            })
            .await?;
        if expired_now {
            self.bus
                .publish(GaugeEvent::SessionExpired { session_id })
                .await;
        }
        Ok(session)
    }

    /// Ingest a monitoring signal and recompute the session's risk
    pub async fn ingest_proctoring_event(
        &self,
        identity: &Identity,
        session_id: Uuid,
        kind: SignalKind,
        severity: Severity,
        details: impl Into<String>,
    ) -> Result<RiskSummary, GaugeError> {
        // Monitors run inside the assessed user's client; reviewers may
        // also report observations
        self.readable_session(identity, session_id).await?;
        Ok(self
            .aggregator
            .ingest(session_id, kind, severity, details)
            .await?)
    }

    /// Current risk classification of a session. Reviewer-only: the
    /// assessed user never sees monitoring aggregates.
    pub async fn get_risk_summary(
        &self,
        identity: &Identity,
        session_id: Uuid,
    ) -> Result<RiskSummary, GaugeError> {
        self.require_reviewer(identity, session_id)?;
        let session = self.sessions.snapshot(session_id).await?;
        Ok(RiskSummary {
            risk_level: session.risk_level,
            suspicious_event_count: session.suspicious_event_count,
        })
    }

    /// Full monitoring history of a session, reviewer-only
    pub async fn proctoring_events(
        &self,
        identity: &Identity,
        session_id: Uuid,
    ) -> Result<Vec<ProctoringEvent>, GaugeError> {
        self.require_reviewer(identity, session_id)?;
        self.sessions.snapshot(session_id).await?;
        Ok(self.aggregator.events_for(session_id).await)
    }

    /// Mark a monitoring event reviewed; never changes the risk level
    pub async fn resolve_proctoring_event(
        &self,
        identity: &Identity,
        event_id: u64,
        notes: impl Into<String>,
    ) -> Result<(), GaugeError> {
        if !identity.role.is_reviewer() {
            return Err(GaugeError::AccessDenied {
                subject: identity.subject_id.clone(),
                session: Uuid::nil(),
            });
        }
        Ok(self
            .aggregator
            .resolve(event_id, identity.subject_id.clone(), notes)
            .await?)
    }

    // ==================== internals ====================

    /// Run `f` in the session's critical section, retrying bounded times on
    /// lock contention
    async fn locked<R>(
        &self,
        session_id: Uuid,
        mut f: impl FnMut(&mut SessionRecord) -> R,
    ) -> Result<R, GaugeError> {
        let mut policy = RetryPolicy::new(self.config.store.lock_retry_attempts);
        loop {
            match self.sessions.with_session(session_id, &mut f).await {
                Err(SessionError::Contention(id)) => match policy.next_delay() {
                    Some(delay) => {
                        warn!(session = %id, delay_ms = delay.as_millis() as u64, "lock contended, retrying");
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(SessionError::Contention(id).into()),
                },
                other => return other.map_err(Into::into),
            }
        }
    }

    /// Lazy expiry transition, performed under the session lock
    fn lazy_expire(record: &mut SessionRecord) -> bool {
        if record.session.is_expired_at(Utc::now()) {
            record.session.mark_expired();
            true
        } else {
            false
        }
    }

    async fn owned_session(
        &self,
        identity: &Identity,
        session_id: Uuid,
    ) -> Result<Session, GaugeError> {
        let session = self.sessions.snapshot(session_id).await?;
        if session.user_id != identity.subject_id {
            return Err(GaugeError::AccessDenied {
                subject: identity.subject_id.clone(),
                session: session_id,
            });
        }
        Ok(session)
    }

    async fn readable_session(
        &self,
        identity: &Identity,
        session_id: Uuid,
    ) -> Result<Session, GaugeError> {
        let session = self.sessions.snapshot(session_id).await?;
        if session.user_id != identity.subject_id && !identity.role.is_reviewer() {
            return Err(GaugeError::AccessDenied {
                subject: identity.subject_id.clone(),
                session: session_id,
            });
        }
        Ok(session)
    }

    fn require_reviewer(&self, identity: &Identity, session_id: Uuid) -> Result<(), GaugeError> {
        if !identity.role.is_reviewer() {
            return Err(GaugeError::AccessDenied {
                subject: identity.subject_id.clone(),
                session: session_id,
            });
        }
        Ok(())
    }

    async fn build_views(
        &self,
        blueprint: &Blueprint,
        answers: &HashMap<i64, AnswerView>,
    ) -> Result<Vec<QuestionView>, GaugeError> {
        let mut views = Vec::with_capacity(blueprint.len());
        for entry in &blueprint.entries {
            let topic = self.catalog.topic(entry.topic_id).await?;
            let competency_name = self
                .catalog
                .competency(entry.competency_id)
                .await
                .map(|c| c.name)
                .unwrap_or_default();
            views.push(QuestionView {
                question_id: entry.question.id,
                order: entry.order,
                tier: entry.question.tier,
                topic_id: entry.topic_id,
                topic_name: topic.name,
                competency_id: entry.competency_id,
                competency_name,
                text: entry.question.text.clone(),
                options: entry.question.options.clone(),
                answer: answers.get(&entry.question.id).copied(),
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Competency, Question, Specialization, Tier, Topic};
    use crate::error::ErrorKind;
    use crate::events::MemoryEventBus;
    use crate::identity::Role;
    use crate::session::SessionStatus;

    async fn full_catalog() -> MemoryCatalog {
        let catalog = MemoryCatalog::new();
        catalog
            .add_specialization(Specialization {
                id: 1,
                name: "Backend development".into(),
            })
            .await;
        for c in 0..5i64 {
            catalog
                .add_competency(Competency {
                    id: c + 1,
                    specialization_id: 1,
                    name: format!("competency {}", c + 1),
                    importance: 90 - (c as u8) * 10,
                })
                .await;
            for t in 0..4i64 {
                let topic_id = (c + 1) * 100 + t;
                catalog
                    .add_topic(Topic {
                        id: topic_id,
                        competency_id: c + 1,
                        name: format!("topic {topic_id}"),
                    })
                    .await;
                for tier in Tier::ALL {
                    catalog
                        .add_question(Question {
                            id: topic_id * 10 + i64::from(tier.rank()),
                            topic_id,
                            tier,
                            text: format!("question {topic_id}/{}", tier.as_str()),
                            options: ["a".into(), "b".into(), "c".into(), "d".into()],
                            correct_option: 1,
                        })
                        .await;
                }
            }
        }
        catalog
    }

    fn employee(id: &str) -> Identity {
        Identity::new(id, format!("User {id}"), Role::Employee)
    }

    fn reviewer() -> Identity {
        Identity::new("hr-1", "HR One", Role::Hr)
    }

    async fn service() -> AssessmentService {
        AssessmentService::new(
            GaugeConfig::default(),
            Arc::new(full_catalog().await),
            Arc::new(MemoryEventBus::new(1000)),
        )
    }

    async fn ready_session(service: &AssessmentService, identity: &Identity) -> Uuid {
        let session = service.create_session(identity, 1).await.unwrap();
        service
            .assemble_session(identity, session.id, 1)
            .await
            .unwrap();
        session.id
    }

    #[tokio::test]
    async fn create_session_binds_caller_and_time_limit() {
        let service = service().await;
        let user = employee("emp-1");
        let session = service.create_session(&user, 1).await.unwrap();

        assert_eq!(session.user_id, "emp-1");
        assert_eq!(session.time_limit_minutes, 40);
        assert_eq!(session.status, SessionStatus::Created);
    }

    #[tokio::test]
    async fn create_session_unknown_specialization_fails() {
        let service = service().await;
        let err = service.create_session(&employee("emp-1"), 99).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn other_users_cannot_touch_a_session() {
        let service = service().await;
        let owner = employee("emp-1");
        let intruder = employee("emp-2");
        let session_id = ready_session(&service, &owner).await;

        let err = service.start_session(&intruder, session_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        let err = service
            .submit_answer(&intruder, session_id, 1001, 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[tokio::test]
    async fn reviewer_reads_but_never_submits() {
        let service = service().await;
        let owner = employee("emp-1");
        let session_id = ready_session(&service, &owner).await;
        service.start_session(&owner, session_id).await.unwrap();

        let hr = reviewer();
        let views = service.get_questions(&hr, session_id).await.unwrap();
        assert_eq!(views.len(), 24);

        let question_id = views[0].question_id;
        let err = service
            .submit_answer(&hr, session_id, question_id, 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[tokio::test]
    async fn start_requires_blueprint() {
        let service = service().await;
        let user = employee("emp-1");
        let session = service.create_session(&user, 1).await.unwrap();

        let err = service.start_session(&user, session.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn start_twice_is_a_state_error() {
        let service = service().await;
        let user = employee("emp-1");
        let session_id = ready_session(&service, &user).await;

        service.start_session(&user, session_id).await.unwrap();
        let err = service.start_session(&user, session_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[tokio::test]
    async fn submit_unknown_question_fails() {
        let service = service().await;
        let user = employee("emp-1");
        let session_id = ready_session(&service, &user).await;
        service.start_session(&user, session_id).await.unwrap();

        let err = service
            .submit_answer(&user, session_id, 999_999, 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn questions_carry_recorded_answers() {
        let service = service().await;
        let user = employee("emp-1");
        let session_id = ready_session(&service, &user).await;
        service.start_session(&user, session_id).await.unwrap();

        let views = service.get_questions(&user, session_id).await.unwrap();
        let first = views[0].question_id;
        assert!(service.submit_answer(&user, session_id, first, 1).await.unwrap());

        let views = service.get_questions(&user, session_id).await.unwrap();
        let answered = views.iter().find(|v| v.question_id == first).unwrap();
        let answer = answered.answer.unwrap();
        assert_eq!(answer.option_index, 1);
        assert!(answer.is_correct);
        assert!(views.iter().filter(|v| v.answer.is_some()).count() == 1);
    }

    #[tokio::test]
    async fn risk_summary_is_reviewer_only() {
        let service = service().await;
        let user = employee("emp-1");
        let session_id = ready_session(&service, &user).await;

        let err = service.get_risk_summary(&user, session_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        let summary = service.get_risk_summary(&reviewer(), session_id).await.unwrap();
        assert_eq!(summary.suspicious_event_count, 0);
    }

    #[tokio::test]
    async fn ingest_updates_risk_readable_by_reviewer() {
        let service = service().await;
        let user = employee("emp-1");
        let session_id = ready_session(&service, &user).await;

        for _ in 0..5 {
            service
                .ingest_proctoring_event(
                    &user,
                    session_id,
                    SignalKind::TabHidden,
                    Severity::High,
                    "tab switched",
                )
                .await
                .unwrap();
        }

        let summary = service.get_risk_summary(&reviewer(), session_id).await.unwrap();
        assert_eq!(summary.suspicious_event_count, 5);
        assert_eq!(
            summary.risk_level,
            crate::proctoring::RiskLevel::High
        );
    }

    #[tokio::test]
    async fn resolve_requires_reviewer_and_keeps_risk() {
        let service = service().await;
        let user = employee("emp-1");
        let session_id = ready_session(&service, &user).await;

        service
            .ingest_proctoring_event(
                &user,
                session_id,
                SignalKind::NoFace,
                Severity::High,
                "face lost",
            )
            .await
            .unwrap();

        let hr = reviewer();
        let events = service.proctoring_events(&hr, session_id).await.unwrap();
        let event_id = events[0].id;

        let err = service
            .resolve_proctoring_event(&user, event_id, "it was me")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        service
            .resolve_proctoring_event(&hr, event_id, "camera glitch")
            .await
            .unwrap();

        let events = service.proctoring_events(&hr, session_id).await.unwrap();
        assert!(events[0].resolved);
        assert_eq!(events[0].reviewer.as_deref(), Some("hr-1"));
    }
}
