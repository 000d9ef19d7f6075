//! # Tabletop Manipulation Task
//!
//! [`ManipulationTask`] drives a mocap-welded gripper over a table. Policy
//! actions are `[dx, dy, dz, gripper]` in `[-1, 1]`; the position part moves
//! the gripper by at most 5 cm per step, the orientation is held fixed, and
//! the gripper scalar opens (positive) or closes (negative) both fingers.
//!
//! The scene must provide the names below: the `arm:` robot joints ending
//! with the two finger joints, the `arm:grip` site, the `arm:mocap` body
//! welded to `arm:gripper_link`, the `target0` marker site and, for object
//! tasks, the `object0` site and `object0:joint` free joint.

use crate::config::{JointInit, TaskConfig};
use crate::driver::StepInfo;
use crate::error::EnvError;
use crate::observation::Observation;
use crate::reward::{compute_reward, compute_reward_batch, is_success};
use crate::task::GoalTask;
use render::{Frame, RenderSurface};
use sim::actuation::{ctrl_set_action, mocap_set_action, reset_mocap_welds, robot_get_obs};
use sim::rotations::mat2euler;
use sim::{SimError, SimState, Simulator, Vec3};

const ROBOT_PREFIX: &str = "arm:";
const GRIP_SITE: &str = "arm:grip";
const GRIPPER_BODY: &str = "arm:gripper_link";
const MOCAP: &str = "arm:mocap";
const FINGER_JOINTS: [&str; 2] = ["arm:l_gripper_joint", "arm:r_gripper_joint"];
const OBJECT_SITE: &str = "object0";
const OBJECT_JOINT: &str = "object0:joint";
const TARGET_SITE: &str = "target0";
const CAMERA: &str = "camera0";
const LIGHT: &str = "light0";

const TABLE_CENTER: Vec3 = Vec3::new(0.8, 0.685, 0.22725);
const TABLE_HALF_EXTENTS: Vec3 = Vec3::new(0.335, 0.165, 0.21225);
const TABLE_MARGIN: f32 = 0.025;
/// Height of objects and goals resting on the table.
const BASE_HEIGHT: f32 = 0.032;
const MAX_GOAL_LIFT: f32 = 0.25;

const POSITION_SCALE: f32 = 0.05;
const GRIPPER_QUAT: [f32; 4] = [-1.0, 0.0, 0.0, 0.0];
const MOCAP_TARGET: Vec3 = Vec3::new(0.8, 0.76, 0.37);
const SETTLE_STEPS: usize = 10;
const INITIAL_GRIPPER_XPOS: Vec3 = Vec3::new(0.8, 0.685, 0.2975);

const CAMERA_BASE: Vec3 = Vec3::new(0.0, -1.0, 1.0);
const CAMERA_JITTER: f32 = 0.1;
const LIGHT_BASE: Vec3 = Vec3::new(0.8, 0.9, 3.0);
const LIGHT_JITTER: f32 = 0.85;

const VIEWER_DISTANCE: f32 = 2.2;
const VIEWER_AZIMUTH: f32 = 145.0;
const VIEWER_ELEVATION: f32 = -25.0;

fn uniform(rng: &mut fastrand::Rng, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * rng.f32()
}

/// Uniform point on the table top, inset by the margin, at resting height.
fn sample_on_table(rng: &mut fastrand::Rng) -> Vec3 {
    let hx = TABLE_HALF_EXTENTS.x - TABLE_MARGIN;
    let hy = TABLE_HALF_EXTENTS.y - TABLE_MARGIN;
    Vec3::new(
        uniform(rng, TABLE_CENTER.x - hx, TABLE_CENTER.x + hx),
        uniform(rng, TABLE_CENTER.y - hy, TABLE_CENTER.y + hy),
        BASE_HEIGHT,
    )
}

/// The 9-element command `[pos(3), quat(4), fingers(2)]` for one action.
#[must_use]
pub fn compose_command(action: [f32; 4], block_gripper: bool) -> [f32; 9] {
    let [dx, dy, dz, g] = action;
    let fingers = if block_gripper { [0.0, 0.0] } else { [g, -g] };
    let [qw, qx, qy, qz] = GRIPPER_QUAT;
    [
        dx * POSITION_SCALE,
        dy * POSITION_SCALE,
        dz * POSITION_SCALE,
        qw,
        qx,
        qy,
        qz,
        fingers[0],
        fingers[1],
    ]
}

/// Goal-conditioned tabletop task over any [`Simulator`].
pub struct ManipulationTask<S: Simulator> {
    sim: S,
    config: TaskConfig,
    surface: Option<Box<dyn RenderSurface>>,
    goal: Vec3,
    initial_state: Option<SimState>,
    initial_gripper_xpos: Vec3,
    height_offset: Option<f32>,
}

impl<S: Simulator> ManipulationTask<S> {
    /// Wrap a simulator. The scene is initialized by the driver.
    ///
    /// # Errors
    /// Returns [`EnvError::InvalidConfig`] for an invalid configuration.
    pub fn new(sim: S, config: TaskConfig) -> Result<Self, EnvError> {
        config.validate()?;
        Ok(Self {
            sim,
            config,
            surface: None,
            goal: Vec3::ZERO,
            initial_state: None,
            initial_gripper_xpos: Vec3::ZERO,
            height_offset: None,
        })
    }

    /// Attach a render surface and aim its viewer camera.
    ///
    /// # Errors
    /// Fails if the gripper body is missing.
    pub fn with_surface(mut self, surface: Box<dyn RenderSurface>) -> Result<Self, EnvError> {
        self.surface = Some(surface);
        self.setup_viewer()?;
        Ok(self)
    }

    /// Point the free camera at the gripper from a fixed distance and angle.
    ///
    /// # Errors
    /// Fails if the gripper body is missing.
    pub fn setup_viewer(&mut self) -> Result<(), EnvError> {
        if let Some(surface) = self.surface.as_mut() {
            let lookat = self.sim.body_xpos(GRIPPER_BODY)?;
            surface.setup_view(lookat, VIEWER_DISTANCE, VIEWER_AZIMUTH, VIEWER_ELEVATION);
        }
        Ok(())
    }

    #[must_use]
    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    #[must_use]
    pub fn surface(&self) -> Option<&dyn RenderSurface> {
        self.surface.as_deref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut (dyn RenderSurface + 'static)> {
        self.surface.as_deref_mut()
    }

    /// Reference gripper position recorded when the scene was initialized.
    #[must_use]
    pub fn initial_gripper_xpos(&self) -> Vec3 {
        self.initial_gripper_xpos
    }

    /// Settled object height recorded when the scene was initialized.
    #[must_use]
    pub fn height_offset(&self) -> Option<f32> {
        self.height_offset
    }

    /// Reward for a batch of goal pairs under this task's reward settings.
    ///
    /// # Errors
    /// Returns [`EnvError::BatchMismatch`] if the batches differ in length.
    pub fn compute_reward_batch(&self, achieved: &[Vec3], desired: &[Vec3]) -> Result<Vec<f32>, EnvError> {
        compute_reward_batch(
            achieved,
            desired,
            self.config.reward_type,
            self.config.distance_threshold,
        )
    }

    fn randomize_appearance(&mut self, rng: &mut fastrand::Rng) -> Result<(), EnvError> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        for name in surface.surface_names() {
            surface.randomize_surface(&name, rng)?;
        }
        let jitter = Vec3::new(
            uniform(rng, -CAMERA_JITTER, CAMERA_JITTER),
            uniform(rng, -CAMERA_JITTER, CAMERA_JITTER),
            uniform(rng, -CAMERA_JITTER, CAMERA_JITTER),
        );
        surface.set_camera_pos(CAMERA, CAMERA_BASE + jitter)?;
        surface.set_light_castshadow(LIGHT, true)?;
        let light = Vec3::new(
            LIGHT_BASE.x + uniform(rng, -LIGHT_JITTER, LIGHT_JITTER),
            LIGHT_BASE.y + uniform(rng, -LIGHT_JITTER, LIGHT_JITTER),
            LIGHT_BASE.z,
        );
        surface.set_light_pos(LIGHT, light)?;
        tracing::debug!("randomized scene appearance");
        Ok(())
    }

    fn place_object(&mut self, rng: &mut fastrand::Rng) -> Result<(), EnvError> {
        let xy = sample_on_table(rng);
        let mut qpos = self.sim.joint_qpos(OBJECT_JOINT)?;
        if qpos.len() != 7 {
            return Err(SimError::ShapeMismatch {
                name: OBJECT_JOINT.to_owned(),
                expected: 7,
                got: qpos.len(),
            }
            .into());
        }
        qpos[0] = xy.x;
        qpos[1] = xy.y;
        qpos[2] = BASE_HEIGHT;
        self.sim.set_joint_qpos(OBJECT_JOINT, &qpos)?;
        Ok(())
    }
}

/// Last two entries of a robot joint vector: the fingers.
fn fingers(values: &[f32]) -> &[f32] {
    &values[values.len().saturating_sub(2)..]
}

impl<S: Simulator> GoalTask for ManipulationTask<S> {
    fn config(&self) -> &TaskConfig {
        &self.config
    }

    fn initialize_scene(&mut self, initial_qpos: &[JointInit]) -> Result<(), EnvError> {
        for init in initial_qpos {
            self.sim.set_joint_qpos(&init.joint, &init.value)?;
        }
        reset_mocap_welds(&mut self.sim);
        self.sim.forward();

        self.sim.set_mocap_pos(MOCAP, MOCAP_TARGET)?;
        self.sim.set_mocap_quat(MOCAP, GRIPPER_QUAT)?;
        for _ in 0..SETTLE_STEPS {
            self.step_simulation();
        }

        self.initial_gripper_xpos = INITIAL_GRIPPER_XPOS;
        if self.config.has_object {
            self.height_offset = Some(self.sim.site_xpos(OBJECT_SITE)?.z);
        }
        self.initial_state = Some(self.sim.get_state());
        tracing::debug!(
            joints = initial_qpos.len(),
            height_offset = ?self.height_offset,
            "scene initialized"
        );
        Ok(())
    }

    fn reset_scene(&mut self, rng: &mut fastrand::Rng) -> Result<bool, EnvError> {
        let state = self.initial_state.as_ref().ok_or(EnvError::Uninitialized)?;
        self.sim.set_state(state)?;

        if self.config.domain_randomization {
            self.randomize_appearance(rng)?;
        }
        if self.config.has_object {
            self.place_object(rng)?;
        }
        self.sim.forward();
        // The sampled object pose is not checked for interpenetration.
        Ok(true)
    }

    fn sample_goal(&mut self, rng: &mut fastrand::Rng) -> Vec3 {
        let mut goal = sample_on_table(rng);
        if self.config.has_object {
            if self.config.target_in_the_air && rng.f32() < 0.5 {
                goal.z += uniform(rng, 0.0, MAX_GOAL_LIFT);
            }
        } else {
            goal.z += uniform(rng, 0.0, MAX_GOAL_LIFT);
        }
        goal
    }

    fn goal(&self) -> Vec3 {
        self.goal
    }

    fn set_goal(&mut self, goal: Vec3) {
        self.goal = goal;
    }

    fn apply_action(&mut self, action: [f32; 4]) -> Result<(), EnvError> {
        let command = compose_command(action, self.config.block_gripper);
        ctrl_set_action(&mut self.sim, &command)?;
        mocap_set_action(&mut self.sim, &command)?;
        Ok(())
    }

    fn step_simulation(&mut self) {
        for _ in 0..self.config.n_substeps {
            self.sim.step();
        }
    }

    fn apply_step_side_effects(&mut self) -> Result<(), EnvError> {
        if self.config.block_gripper {
            for joint in FINGER_JOINTS {
                self.sim.set_joint_qpos(joint, &[0.0])?;
            }
            self.sim.forward();
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn build_observation(&self) -> Result<Observation, EnvError> {
        let dt = self.config.n_substeps as f32 * self.sim.timestep();
        let grip_pos = self.sim.site_xpos(GRIP_SITE)?;
        let grip_velp = self.sim.site_xvelp(GRIP_SITE)? * dt;
        let (robot_qpos, robot_qvel) = robot_get_obs(&self.sim, ROBOT_PREFIX)?;
        let gripper_state = fingers(&robot_qpos);
        let gripper_vel: Vec<f32> = fingers(&robot_qvel).iter().map(|v| v * dt).collect();

        let mut observation = Vec::with_capacity(25);
        observation.extend_from_slice(Vec3::flatten(&[grip_pos]));
        let achieved_goal = if self.config.has_object {
            let object_pos = self.sim.site_xpos(OBJECT_SITE)?;
            let object_rot = mat2euler(&self.sim.site_xmat(OBJECT_SITE)?);
            let object_velp = self.sim.site_xvelp(OBJECT_SITE)? * dt - grip_velp;
            let object_velr = self.sim.site_xvelr(OBJECT_SITE)? * dt;
            let object_rel_pos = object_pos - grip_pos;

            observation.extend_from_slice(Vec3::flatten(&[object_pos, object_rel_pos]));
            observation.extend_from_slice(gripper_state);
            observation.extend_from_slice(Vec3::flatten(&[object_rot, object_velp, object_velr]));
            object_pos
        } else {
            observation.extend_from_slice(gripper_state);
            grip_pos
        };
        observation.extend_from_slice(Vec3::flatten(&[grip_velp]));
        observation.extend(gripper_vel);

        Ok(Observation {
            observation,
            achieved_goal,
            desired_goal: self.goal,
        })
    }

    fn check_success(&self, achieved: Vec3, desired: Vec3) -> f32 {
        is_success(achieved, desired, self.config.distance_threshold)
    }

    fn compute_reward(&self, achieved: Vec3, desired: Vec3, _info: &StepInfo) -> f32 {
        compute_reward(
            achieved,
            desired,
            self.config.reward_type,
            self.config.distance_threshold,
        )
    }

    fn render_goal_marker(&mut self) -> Result<(), EnvError> {
        let offset = match self.sim.site_names().first() {
            Some(first) => self.sim.site_xpos(first)? - self.sim.site_pos(first)?,
            None => Vec3::ZERO,
        };
        self.sim.set_site_pos(TARGET_SITE, self.goal - offset)?;
        self.sim.forward();
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<Frame>, EnvError> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(None);
        };
        surface.use_fixed_camera(0)?;
        Ok(Some(surface.read_pixels(&self.sim)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_action_scales_position_and_mirrors_gripper() {
        let command = compose_command([1.0, 1.0, 1.0, 1.0], false);
        assert_eq!(&command[..3], &[0.05, 0.05, 0.05]);
        assert_eq!(&command[3..7], &[-1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&command[7..], &[1.0, -1.0]);
    }

    #[test]
    fn blocked_gripper_command_is_zero() {
        let command = compose_command([1.0, 1.0, 1.0, 1.0], true);
        assert_eq!(&command[..3], &[0.05, 0.05, 0.05]);
        assert_eq!(&command[7..], &[0.0, 0.0]);
        assert_eq!(&compose_command([0.2, -0.4, 0.0, -0.7], true)[7..], &[0.0, 0.0]);
    }

    #[test]
    fn table_samples_stay_inside_the_inset_rectangle() {
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..500 {
            let p = sample_on_table(&mut rng);
            assert!((p.x - 0.8).abs() <= 0.31 + 1e-6);
            assert!((p.y - 0.685).abs() <= 0.14 + 1e-6);
            assert_eq!(p.z, BASE_HEIGHT);
        }
    }
}
