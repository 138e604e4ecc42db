//! Question bank read model
//!
//! The catalog is produced offline by the content-generation pipeline and
//! is read-only for the lifetime of an assessment session.

mod store;
mod types;

pub use store::{CatalogError, MemoryCatalog};
pub use types::{
    Competency, CompetencyPool, Question, Specialization, Tier, TieredQuestions, Topic,
};
