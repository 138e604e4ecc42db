//! Assembly service
//!
//! Orchestrates the sampler, resolves every tiered question up front, and
//! persists the blueprint atomically: any failure leaves zero assignment
//! rows for the session.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{CatalogError, MemoryCatalog, TieredQuestions};
use crate::error::SessionError;
use crate::events::{EventBus, GaugeEvent};
use crate::sampler::{self, PlannedTopic, SamplerError};
use crate::session::MemorySessionStore;

use super::blueprint::{Blueprint, BlueprintEntry, TopicAssignment};
use super::store::MemoryAssignmentStore;

/// Errors raised while assembling a blueprint
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("session is bound to specialization {expected}, not {requested}")]
    SpecializationMismatch { expected: i64, requested: i64 },

    #[error("session has no blueprint yet: {0}")]
    NotAssembled(Uuid),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("sampler error: {0}")]
    Sampler(#[from] SamplerError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Builds and stores exam blueprints
pub struct AssemblyService {
    catalog: Arc<MemoryCatalog>,
    sessions: Arc<MemorySessionStore>,
    assignments: Arc<MemoryAssignmentStore>,
    bus: Arc<dyn EventBus>,
}

impl AssemblyService {
    pub fn new(
        catalog: Arc<MemoryCatalog>,
        sessions: Arc<MemorySessionStore>,
        assignments: Arc<MemoryAssignmentStore>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            catalog,
            sessions,
            assignments,
            bus,
        }
    }

    /// Assemble the session's blueprint, or return the existing one.
    ///
    /// Topic selection is randomized; everything else is deterministic.
    /// The write is all-or-nothing: question resolution happens before any
    /// assignment row is stored.
    pub async fn assemble(
        &self,
        session_id: Uuid,
        specialization_id: i64,
    ) -> Result<Blueprint, AssemblyError> {
        let session = self.sessions.snapshot(session_id).await?;
        if session.specialization_id != specialization_id {
            return Err(AssemblyError::SpecializationMismatch {
                expected: session.specialization_id,
                requested: specialization_id,
            });
        }

        // Idempotent fast path: assignments already stored
        if let Some(rows) = self.assignments.get(session_id).await {
            debug!(session = %session_id, "blueprint already assembled");
            return self.build_blueprint(session_id, &rows).await;
        }

        let pools = self.catalog.competencies_for(specialization_id).await?;
        let counts = sampler::plan_distribution(&pools)?;
        let planned = {
            let mut rng = rand::thread_rng();
            sampler::draw_topics(&pools, &counts, &mut rng)
        };

        // Resolve all 24 questions before writing anything
        let mut resolved: Vec<(PlannedTopic, TieredQuestions)> = Vec::with_capacity(planned.len());
        for topic in planned {
            let questions = self.catalog.questions_for_topic(topic.topic_id).await?;
            resolved.push((topic, questions));
        }

        let rows: Vec<TopicAssignment> = resolved
            .iter()
            .enumerate()
            .map(|(i, (topic, _))| TopicAssignment {
                session_id,
                topic_id: topic.topic_id,
                competency_id: topic.competency_id,
                order: (i + 1) as u8,
            })
            .collect();

        let (stored, inserted) = self.assignments.try_insert(session_id, rows).await;
        if !inserted {
            // Lost a concurrent race; the stored rows are authoritative
            return self.build_blueprint(session_id, &stored).await;
        }

        let entries = resolved
            .into_iter()
            .zip(&stored)
            .flat_map(|((topic, questions), row)| {
                let order = row.order;
                questions.in_order().map(|question| BlueprintEntry {
                    order,
                    topic_id: topic.topic_id,
                    competency_id: topic.competency_id,
                    question: question.clone(),
                })
            })
            .collect();

        info!(session = %session_id, specialization = specialization_id, "blueprint assembled");
        self.bus
            .publish(GaugeEvent::SessionAssembled { session_id })
            .await;

        Ok(Blueprint::new(session_id, entries))
    }

    /// Load the stored blueprint for a session
    pub async fn blueprint(&self, session_id: Uuid) -> Result<Blueprint, AssemblyError> {
        let rows = self
            .assignments
            .get(session_id)
            .await
            .ok_or(AssemblyError::NotAssembled(session_id))?;
        self.build_blueprint(session_id, &rows).await
    }

    async fn build_blueprint(
        &self,
        session_id: Uuid,
        rows: &[TopicAssignment],
    ) -> Result<Blueprint, AssemblyError> {
        let mut entries = Vec::with_capacity(rows.len() * 3);
        for row in rows {
            let questions = self.catalog.questions_for_topic(row.topic_id).await?;
            for question in questions.in_order() {
                entries.push(BlueprintEntry {
                    order: row.order,
                    topic_id: row.topic_id,
                    competency_id: row.competency_id,
                    question: question.clone(),
                });
            }
        }
        Ok(Blueprint::new(session_id, entries))
    }
}
