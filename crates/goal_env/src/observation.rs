use serde::Serialize;
use sim::Vec3;

/// One goal-conditioned observation, built fresh from simulator state.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub observation: Vec<f32>,
    pub achieved_goal: Vec3,
    pub desired_goal: Vec3,
}

/// Lengths of each observation field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ObservationSpace {
    pub observation: usize,
    pub achieved_goal: usize,
    pub desired_goal: usize,
}

impl ObservationSpace {
    #[must_use]
    pub fn of(obs: &Observation) -> Self {
        Self {
            observation: obs.observation.len(),
            achieved_goal: 3,
            desired_goal: 3,
        }
    }
}
