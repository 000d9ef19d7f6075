//! Goal distance, reward and success.

use crate::config::RewardType;
use crate::error::EnvError;
use sim::Vec3;

/// Euclidean distance between two goals.
#[must_use]
pub fn goal_distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

#[must_use]
pub fn compute_reward(achieved: Vec3, desired: Vec3, reward_type: RewardType, threshold: f32) -> f32 {
    let d = goal_distance(achieved, desired);
    match reward_type {
        RewardType::Sparse => {
            if d > threshold {
                -1.0
            } else {
                0.0
            }
        }
        RewardType::Dense => -d,
    }
}

/// Reward for each pair of a batch of goals, as used for relabelling
/// transitions with substituted goals.
///
/// # Errors
/// Returns [`EnvError::BatchMismatch`] if the batches differ in length.
pub fn compute_reward_batch(
    achieved: &[Vec3],
    desired: &[Vec3],
    reward_type: RewardType,
    threshold: f32,
) -> Result<Vec<f32>, EnvError> {
    if achieved.len() != desired.len() {
        return Err(EnvError::BatchMismatch {
            achieved: achieved.len(),
            desired: desired.len(),
        });
    }
    Ok(achieved
        .iter()
        .zip(desired)
        .map(|(a, d)| compute_reward(*a, *d, reward_type, threshold))
        .collect())
}

/// `1.0` when strictly closer than the threshold, `0.0` otherwise.
#[must_use]
pub fn is_success(achieved: Vec3, desired: Vec3, threshold: f32) -> f32 {
    if goal_distance(achieved, desired) < threshold {
        1.0
    } else {
        0.0
    }
}
