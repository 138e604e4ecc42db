//! Session lifecycle: state machine, storage and expiry sweep

mod store;
mod sweep;
mod types;

pub use store::{MemorySessionStore, SessionRecord};
pub use sweep::ExpirySweeper;
pub use types::{
    Answer, CompletionSummary, DEFAULT_TIME_LIMIT_MINUTES, QUESTIONS_PER_SESSION,
    QualificationLevel, Session, SessionStatus,
};
