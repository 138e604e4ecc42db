//! gauge-core: competency assessment engine
//!
//! This crate provides the core of the gauge assessment platform:
//!
//! - **Topic sampling** - [`sampler`] distributes the 8-topic quota across
//!   competencies by importance and draws concrete topics at random
//! - **Blueprint assembly** - [`AssemblyService`] binds topics to their
//!   tiered questions and persists an immutable blueprint once per session
//! - **Session lifecycle** - [`Session`] state machine with per-session
//!   exclusive locking, plus the [`ExpirySweeper`] that force-expires
//!   abandoned attempts
//! - **Proctoring** - [`RiskAggregator`] ingests monitoring signals and
//!   recomputes a discrete risk level on every event
//! - **Identity boundary** - [`IdentityGateway`] trait and whitelist; the
//!   core consumes verified identities, never directory protocols
//! - **Operations facade** - [`AssessmentService`] exposes the boundary
//!   operations with ownership and reviewer authorization
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gauge_core::{AssessmentService, GaugeConfig, MemoryCatalog, MemoryEventBus};
//!
//! # async fn example() -> Result<(), gauge_core::GaugeError> {
//! let catalog = Arc::new(MemoryCatalog::new());
//! let bus = Arc::new(MemoryEventBus::new(1024));
//! let service = AssessmentService::new(GaugeConfig::default(), catalog, bus);
//!
//! // Spawn the active expiry sweep
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let sweeper = service.sweeper();
//! tokio::spawn(async move { sweeper.run(shutdown_rx).await });
//! # Ok(())
//! # }
//! ```
//!
//! # Data flow
//!
//! ```text
//! Identity Gateway ─▶ AssessmentService ─▶ AssemblyService ─▶ TopicSampler
//!                            │                    │
//!                            ▼                    ▼
//!                     Session store ◀──── question resolution
//!                        │      ▲
//!          ExpirySweeper ┘      └ RiskAggregator ◀─ monitoring events
//! ```

pub mod assembly;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod proctoring;
pub mod sampler;
pub mod service;
pub mod session;

// Re-export key types for convenience
pub use assembly::{AssemblyError, AssemblyService, Blueprint, BlueprintEntry, TopicAssignment};
pub use catalog::{
    CatalogError, Competency, CompetencyPool, MemoryCatalog, Question, Specialization, Tier,
    Topic,
};
pub use config::{ExamConfig, GaugeConfig, StoreConfig, SweepConfig};
pub use error::{ErrorKind, GaugeError, SessionError};
pub use events::{EventBus, EventSeq, GaugeEvent, MemoryEventBus};
pub use identity::{
    AuthError, Identity, IdentityConfig, IdentityGateway, MockGateway, Permission, Role,
    Whitelist,
};
pub use proctoring::{
    ProctoringError, ProctoringEvent, RiskAggregator, RiskLevel, RiskSummary, Severity,
    SignalKind,
};
pub use sampler::{PlannedTopic, SamplerError, TOPIC_QUOTA};
pub use service::{AnswerView, AssessmentService, QuestionView};
pub use session::{
    Answer, CompletionSummary, DEFAULT_TIME_LIMIT_MINUTES, ExpirySweeper, MemorySessionStore,
    QUESTIONS_PER_SESSION, QualificationLevel, Session, SessionStatus,
};
