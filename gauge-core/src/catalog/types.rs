//! Core catalog types

use serde::{Deserialize, Serialize};

/// Difficulty tier of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Junior,
    Middle,
    Senior,
}

impl Tier {
    /// All tiers in presentation order (junior < middle < senior)
    pub const ALL: [Tier; 3] = [Tier::Junior, Tier::Middle, Tier::Senior];

    /// Sort rank within a topic
    pub fn rank(&self) -> u8 {
        match self {
            Self::Junior => 1,
            Self::Middle => 2,
            Self::Senior => 3,
        }
    }

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Middle => "middle",
            Self::Senior => "senior",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "junior" => Some(Self::Junior),
            "middle" => Some(Self::Middle),
            "senior" => Some(Self::Senior),
            _ => None,
        }
    }
}

/// Named skill track owning an ordered set of competencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialization {
    pub id: i64,
    pub name: String,
}

/// Rated skill area within a specialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competency {
    pub id: i64,
    pub specialization_id: i64,
    pub name: String,
    /// Ranking weight, 0-100. Used only for ordering, never as a literal
    /// multiplier.
    pub importance: u8,
}

/// Themed subset of a competency, backed by exactly three tiered questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub competency_id: i64,
    pub name: String,
}

/// A single multiple-choice question
///
/// Immutable once created. `correct_option` is 1-based (1..=4) to match the
/// stored representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub topic_id: i64,
    pub tier: Tier,
    pub text: String,
    pub options: [String; 4],
    pub correct_option: u8,
}

impl Question {
    /// Whether a 1-based chosen option matches the correct one
    pub fn is_correct(&self, option: u8) -> bool {
        self.correct_option == option
    }
}

/// The three questions backing a topic, one per tier
#[derive(Debug, Clone)]
pub struct TieredQuestions {
    pub junior: Question,
    pub middle: Question,
    pub senior: Question,
}

impl TieredQuestions {
    /// Questions in tier rank order
    pub fn in_order(&self) -> [&Question; 3] {
        [&self.junior, &self.middle, &self.senior]
    }
}

/// A competency with its drawable topic pool, as consumed by the sampler
#[derive(Debug, Clone)]
pub struct CompetencyPool {
    pub competency_id: i64,
    pub importance: u8,
    pub topics: Vec<i64>,
}

impl CompetencyPool {
    pub fn pool_size(&self) -> usize {
        self.topics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_rank_is_ordered() {
        assert!(Tier::Junior.rank() < Tier::Middle.rank());
        assert!(Tier::Middle.rank() < Tier::Senior.rank());
    }

    #[test]
    fn tier_roundtrip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(Tier::parse("principal"), None);
    }

    #[test]
    fn tier_serializes_to_snake_case() {
        let json = serde_json::to_string(&Tier::Middle).unwrap();
        assert_eq!(json, "\"middle\"");
    }

    #[test]
    fn question_correctness_check() {
        let q = Question {
            id: 1,
            topic_id: 10,
            tier: Tier::Junior,
            text: "2 + 2?".into(),
            options: ["3".into(), "4".into(), "5".into(), "6".into()],
            correct_option: 2,
        };
        assert!(q.is_correct(2));
        assert!(!q.is_correct(1));
    }

    #[test]
    fn tiered_questions_in_order() {
        let q = |tier: Tier| Question {
            id: tier.rank() as i64,
            topic_id: 1,
            tier,
            text: String::new(),
            options: Default::default(),
            correct_option: 1,
        };
        let tiered = TieredQuestions {
            junior: q(Tier::Junior),
            middle: q(Tier::Middle),
            senior: q(Tier::Senior),
        };
        let tiers: Vec<_> = tiered.in_order().iter().map(|q| q.tier).collect();
        assert_eq!(tiers, vec![Tier::Junior, Tier::Middle, Tier::Senior]);
    }
}
