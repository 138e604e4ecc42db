//! In-memory catalog storage
//!
//! Holds the question bank loaded from the external content pipeline.
//! Writes happen at load time; assessment code only reads.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;

use super::types::{
    Competency, CompetencyPool, Question, Specialization, Tier, TieredQuestions, Topic,
};

/// Errors raised by catalog lookups
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("specialization not found: {0}")]
    SpecializationNotFound(i64),

    #[error("topic not found: {0}")]
    TopicNotFound(i64),

    #[error("question not found: {0}")]
    QuestionNotFound(i64),

    #[error("topic {topic_id} has no {} question", tier.as_str())]
    MissingTier { topic_id: i64, tier: Tier },
}

/// In-memory question bank
pub struct MemoryCatalog {
    inner: RwLock<CatalogData>,
}

#[derive(Default)]
struct CatalogData {
    specializations: HashMap<i64, Specialization>,
    competencies: HashMap<i64, Competency>,
    topics: HashMap<i64, Topic>,
    questions: HashMap<i64, Question>,
    /// Insertion order of competencies per specialization, for stable ties
    competency_order: HashMap<i64, Vec<i64>>,
    topics_by_competency: HashMap<i64, Vec<i64>>,
    questions_by_topic: HashMap<i64, Vec<i64>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CatalogData::default()),
        }
    }

    pub async fn add_specialization(&self, spec: Specialization) {
        let mut data = self.inner.write().await;
        data.competency_order.entry(spec.id).or_default();
        data.specializations.insert(spec.id, spec);
    }

    pub async fn add_competency(&self, competency: Competency) {
        let mut data = self.inner.write().await;
        data.competency_order
            .entry(competency.specialization_id)
            .or_default()
            .push(competency.id);
        data.topics_by_competency.entry(competency.id).or_default();
        data.competencies.insert(competency.id, competency);
    }

    pub async fn add_topic(&self, topic: Topic) {
        let mut data = self.inner.write().await;
        data.topics_by_competency
            .entry(topic.competency_id)
            .or_default()
            .push(topic.id);
        data.questions_by_topic.entry(topic.id).or_default();
        data.topics.insert(topic.id, topic);
    }

    pub async fn add_question(&self, question: Question) {
        let mut data = self.inner.write().await;
        data.questions_by_topic
            .entry(question.topic_id)
            .or_default()
            .push(question.id);
        data.questions.insert(question.id, question);
    }

    /// Competencies of a specialization with their topic pools, ordered by
    /// descending importance. Equal importance keeps insertion order.
    pub async fn competencies_for(
        &self,
        specialization_id: i64,
    ) -> Result<Vec<CompetencyPool>, CatalogError> {
        let data = self.inner.read().await;
        let order = data
            .competency_order
            .get(&specialization_id)
            .filter(|_| data.specializations.contains_key(&specialization_id))
            .ok_or(CatalogError::SpecializationNotFound(specialization_id))?;

        let mut pools: Vec<CompetencyPool> = order
            .iter()
            .filter_map(|id| data.competencies.get(id))
            .map(|c| CompetencyPool {
                competency_id: c.id,
                importance: c.importance,
                topics: data
                    .topics_by_competency
                    .get(&c.id)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        // Stable sort keeps insertion order for equal importance
        pools.sort_by(|a, b| b.importance.cmp(&a.importance));
        Ok(pools)
    }

    pub async fn topic(&self, topic_id: i64) -> Result<Topic, CatalogError> {
        self.inner
            .read()
            .await
            .topics
            .get(&topic_id)
            .cloned()
            .ok_or(CatalogError::TopicNotFound(topic_id))
    }

    pub async fn question(&self, question_id: i64) -> Result<Question, CatalogError> {
        self.inner
            .read()
            .await
            .questions
            .get(&question_id)
            .cloned()
            .ok_or(CatalogError::QuestionNotFound(question_id))
    }

    pub async fn competency(&self, competency_id: i64) -> Option<Competency> {
        self.inner.read().await.competencies.get(&competency_id).cloned()
    }

    /// The three tiered questions of a topic. Fails if any tier is missing,
    /// which assembly treats as a data-integrity error.
    pub async fn questions_for_topic(
        &self,
        topic_id: i64,
    ) -> Result<TieredQuestions, CatalogError> {
        let data = self.inner.read().await;
        if !data.topics.contains_key(&topic_id) {
            return Err(CatalogError::TopicNotFound(topic_id));
        }
        let ids = data
            .questions_by_topic
            .get(&topic_id)
            .cloned()
            .unwrap_or_default();

        let mut by_tier: HashMap<Tier, Question> = HashMap::new();
        for id in ids {
            if let Some(q) = data.questions.get(&id) {
                by_tier.entry(q.tier).or_insert_with(|| q.clone());
            }
        }

        let mut take = |tier: Tier| {
            by_tier
                .remove(&tier)
                .ok_or(CatalogError::MissingTier { topic_id, tier })
        };
        Ok(TieredQuestions {
            junior: take(Tier::Junior)?,
            middle: take(Tier::Middle)?,
            senior: take(Tier::Senior)?,
        })
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}
