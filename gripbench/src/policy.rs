//! # Baseline Policies
//!
//! Two policies for smoke-testing the tasks: uniform random actions, and a
//! scripted controller that reads the gripper and object positions straight
//! out of the observation vector.

use goal_env::{Observation, TaskConfig, ACTION_SIZE};
use sim::Vec3;

/// Distance the gripper travels for a unit action component.
const STEP_REACH: f32 = 0.05;
/// Clearance kept above the object while lining up.
const HOVER: f32 = 0.1;
/// How far behind the object the pusher sets down.
const PUSH_STANDOFF: f32 = 0.06;
const CLOSE_STEPS: usize = 3;
const ALIGNED: f32 = 0.01;

pub trait Policy {
    /// Forget per-episode state.
    fn reset(&mut self) {}

    fn act(&mut self, observation: &Observation) -> [f32; ACTION_SIZE];
}

pub struct RandomPolicy {
    rng: fastrand::Rng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> [f32; ACTION_SIZE] {
        std::array::from_fn(|_| self.rng.f32() * 2.0 - 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Approach,
    Descend,
    Close(usize),
    Carry,
}

/// Hand-written controller for the reach, push and pick-and-place tasks.
pub struct ScriptedPolicy {
    has_object: bool,
    block_gripper: bool,
    phase: Phase,
}

impl ScriptedPolicy {
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        Self {
            has_object: config.has_object,
            block_gripper: config.block_gripper,
            phase: Phase::Approach,
        }
    }

    fn pick(&mut self, grip: Vec3, object: Vec3, goal: Vec3) -> [f32; ACTION_SIZE] {
        let above = object + Vec3::new(0.0, 0.0, HOVER);
        match self.phase {
            Phase::Approach => {
                if grip.distance(above) < ALIGNED {
                    self.phase = Phase::Descend;
                }
                toward(grip, above, 1.0)
            }
            Phase::Descend => {
                if grip.distance(object) < ALIGNED {
                    self.phase = Phase::Close(0);
                }
                toward(grip, object, 1.0)
            }
            Phase::Close(n) => {
                self.phase = if n + 1 >= CLOSE_STEPS {
                    Phase::Carry
                } else {
                    Phase::Close(n + 1)
                };
                [0.0, 0.0, 0.0, -1.0]
            }
            Phase::Carry => toward(grip, goal, -1.0),
        }
    }

    fn push(&mut self, grip: Vec3, object: Vec3, goal: Vec3) -> [f32; ACTION_SIZE] {
        let heading = Vec3::new(goal.x - object.x, goal.y - object.y, 0.0);
        if heading.length() < ALIGNED {
            return [0.0; ACTION_SIZE];
        }
        let behind = object - heading.normalize() * PUSH_STANDOFF;
        let above = behind + Vec3::new(0.0, 0.0, HOVER);
        match self.phase {
            Phase::Approach => {
                if grip.distance(above) < ALIGNED {
                    self.phase = Phase::Descend;
                }
                toward(grip, above, 0.0)
            }
            Phase::Descend => {
                if grip.distance(behind) < ALIGNED {
                    self.phase = Phase::Carry;
                }
                toward(grip, behind, 0.0)
            }
            Phase::Close(_) | Phase::Carry => {
                // Sweep through the object toward the goal at table height.
                let through = goal - heading.normalize() * (PUSH_STANDOFF * 0.5);
                toward(grip, Vec3::new(through.x, through.y, object.z), 0.0)
            }
        }
    }
}

impl Policy for ScriptedPolicy {
    fn reset(&mut self) {
        self.phase = Phase::Approach;
    }

    fn act(&mut self, observation: &Observation) -> [f32; ACTION_SIZE] {
        let grip = gripper_position(observation);
        let goal = observation.desired_goal;
        if !self.has_object {
            return toward(grip, goal, 0.0);
        }
        let object = observation.achieved_goal;
        if self.block_gripper {
            self.push(grip, object, goal)
        } else {
            self.pick(grip, object, goal)
        }
    }
}

/// The gripper position leads every observation vector.
fn gripper_position(observation: &Observation) -> Vec3 {
    Vec3::from_slice(&observation.observation).unwrap_or(observation.achieved_goal)
}

/// Proportional move toward `target`; the driver clips the result.
fn toward(from: Vec3, target: Vec3, gripper: f32) -> [f32; ACTION_SIZE] {
    let d = (target - from) * (1.0 / STEP_REACH);
    [d.x, d.y, d.z, gripper]
}
