//! Weighted topic sampling
//!
//! Distributes the fixed 8-topic quota across a specialization's
//! competencies by importance rank, then draws concrete topics uniformly
//! without replacement. The distribution shape is deterministic for a given
//! competency layout; the drawn topics are not.

use rand::Rng;
use rand::seq::index;
use thiserror::Error;

use crate::catalog::CompetencyPool;

/// Topics selected per session
pub const TOPIC_QUOTA: usize = 8;

/// Errors raised while planning a distribution
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("topic pools too small: {available} available, {required} required")]
    InsufficientData { available: usize, required: usize },
}

/// A drawn topic together with its owning competency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTopic {
    pub competency_id: i64,
    pub topic_id: i64,
}

/// Plan how many topics each competency contributes.
///
/// `pools` must be ordered by descending importance (ties keeping their
/// original order), which is how the catalog hands them out. Every
/// competency starts at `quota / n`; the remainder goes one unit each to
/// the highest-ranked competencies. Counts are then clamped to pool size
/// and the overflow re-granted top-down to competencies with spare
/// capacity.
pub fn plan_distribution(pools: &[CompetencyPool]) -> Result<Vec<usize>, SamplerError> {
    let available: usize = pools.iter().map(CompetencyPool::pool_size).sum();
    if pools.is_empty() || available < TOPIC_QUOTA {
        return Err(SamplerError::InsufficientData {
            available,
            required: TOPIC_QUOTA,
        });
    }

    let base = TOPIC_QUOTA / pools.len();
    let remainder = TOPIC_QUOTA % pools.len();

    let mut counts: Vec<usize> = pools
        .iter()
        .enumerate()
        .map(|(rank, _)| base + usize::from(rank < remainder))
        .collect();

    // Clamp to pool capacity, collect the overflow
    let mut overflow = 0;
    for (count, pool) in counts.iter_mut().zip(pools) {
        if *count > pool.pool_size() {
            overflow += *count - pool.pool_size();
            *count = pool.pool_size();
        }
    }

    // Re-grant overflow to the highest-ranked competencies with room left
    while overflow > 0 {
        let mut granted = false;
        for (count, pool) in counts.iter_mut().zip(pools) {
            if overflow == 0 {
                break;
            }
            if *count < pool.pool_size() {
                *count += 1;
                overflow -= 1;
                granted = true;
            }
        }
        if !granted {
            // Cannot happen once `available >= TOPIC_QUOTA`, kept as a guard
            return Err(SamplerError::InsufficientData {
                available,
                required: TOPIC_QUOTA,
            });
        }
    }

    debug_assert_eq!(counts.iter().sum::<usize>(), TOPIC_QUOTA);
    Ok(counts)
}

/// Draw the planned number of distinct topics from each pool.
///
/// Results are flattened in competency order; within a competency the draw
/// order is preserved.
pub fn draw_topics<R: Rng + ?Sized>(
    pools: &[CompetencyPool],
    counts: &[usize],
    rng: &mut R,
) -> Vec<PlannedTopic> {
    let mut planned = Vec::with_capacity(TOPIC_QUOTA);
    for (pool, &count) in pools.iter().zip(counts) {
        for idx in index::sample(rng, pool.topics.len(), count) {
            planned.push(PlannedTopic {
                competency_id: pool.competency_id,
                topic_id: pool.topics[idx],
            });
        }
    }
    planned
}

/// Convenience wrapper: plan and draw in one step.
pub fn sample_topics<R: Rng + ?Sized>(
    pools: &[CompetencyPool],
    rng: &mut R,
) -> Result<Vec<PlannedTopic>, SamplerError> {
    let counts = plan_distribution(pools)?;
    Ok(draw_topics(pools, &counts, rng))
}
