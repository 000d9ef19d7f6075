//! Task configuration.
//!
//! A [`TaskConfig`] is fixed once the task is built. Configurations are
//! usually taken from one of the presets and optionally loaded from JSON.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    /// `-1` while the goal is farther than the threshold, `0` once within it.
    #[default]
    Sparse,
    /// Negative goal distance.
    Dense,
}

/// Initial position of one named joint. Free joints take 7 values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointInit {
    pub joint: String,
    pub value: Vec<f32>,
}

impl JointInit {
    #[must_use]
    pub fn new(joint: &str, value: &[f32]) -> Self {
        Self {
            joint: joint.to_owned(),
            value: value.to_vec(),
        }
    }
}

fn default_n_substeps() -> usize {
    20
}

fn default_max_episode_steps() -> usize {
    50
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Extra height of the gripper above the table at the start of an episode.
    pub gripper_extra_height: f32,
    /// Keep the fingers shut for the whole episode.
    pub block_gripper: bool,
    pub has_object: bool,
    /// Let goals float above the table (half of them, when there is an object).
    pub target_in_the_air: bool,
    pub target_offset: [f32; 3],
    /// Half-width of the object sampling region.
    pub obj_range: f32,
    /// Half-width of the goal sampling region.
    pub target_range: f32,
    /// Goal distance below which an episode counts as solved.
    pub distance_threshold: f32,
    /// Joint positions applied in order when the scene is initialized.
    pub initial_qpos: Vec<JointInit>,
    pub reward_type: RewardType,
    #[serde(default)]
    pub domain_randomization: bool,
    /// Physics ticks per environment step.
    #[serde(default = "default_n_substeps")]
    pub n_substeps: usize,
    #[serde(default = "default_max_episode_steps")]
    pub max_episode_steps: usize,
}

fn arm_at_rest() -> Vec<JointInit> {
    vec![
        JointInit::new("arm:slide_x", &[0.0]),
        JointInit::new("arm:slide_y", &[0.0]),
        JointInit::new("arm:slide_z", &[0.0]),
        JointInit::new("arm:l_gripper_joint", &[0.0]),
        JointInit::new("arm:r_gripper_joint", &[0.0]),
    ]
}

fn arm_and_object() -> Vec<JointInit> {
    let mut qpos = arm_at_rest();
    qpos.push(JointInit::new(
        "object0:joint",
        &[0.8, 0.685, 0.032, 1.0, 0.0, 0.0, 0.0],
    ));
    qpos
}

impl TaskConfig {
    /// Move the gripper to a floating goal; fingers blocked, no object.
    #[must_use]
    pub fn reach() -> Self {
        Self {
            gripper_extra_height: 0.2,
            block_gripper: true,
            has_object: false,
            target_in_the_air: true,
            target_offset: [0.0; 3],
            obj_range: 0.15,
            target_range: 0.15,
            distance_threshold: 0.05,
            initial_qpos: arm_at_rest(),
            reward_type: RewardType::Sparse,
            domain_randomization: false,
            n_substeps: default_n_substeps(),
            max_episode_steps: default_max_episode_steps(),
        }
    }

    /// Push the object to a goal on the table with closed fingers.
    #[must_use]
    pub fn push() -> Self {
        Self {
            gripper_extra_height: 0.0,
            block_gripper: true,
            has_object: true,
            target_in_the_air: false,
            initial_qpos: arm_and_object(),
            ..Self::reach()
        }
    }

    /// Grasp the object and carry it to a goal that may be in the air.
    #[must_use]
    pub fn pick_and_place() -> Self {
        Self {
            gripper_extra_height: 0.2,
            block_gripper: false,
            has_object: true,
            target_in_the_air: true,
            initial_qpos: arm_and_object(),
            ..Self::reach()
        }
    }

    /// Look up a preset by name (`reach`, `push`, `pick_and_place`).
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "reach" => Some(Self::reach()),
            "push" => Some(Self::push()),
            "pick_and_place" | "pick-and-place" => Some(Self::pick_and_place()),
            _ => None,
        }
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// Malformed JSON, unknown fields and invalid values are rejected.
    pub fn from_json(json: &str) -> Result<Self, EnvError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`EnvError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), EnvError> {
        let non_negative = [
            ("obj_range", self.obj_range),
            ("target_range", self.target_range),
            ("distance_threshold", self.distance_threshold),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EnvError::InvalidConfig(format!(
                    "{field} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.gripper_extra_height.is_finite() || self.target_offset.iter().any(|v| !v.is_finite()) {
            return Err(EnvError::InvalidConfig(
                "gripper_extra_height and target_offset must be finite".to_owned(),
            ));
        }
        if self.n_substeps == 0 {
            return Err(EnvError::InvalidConfig("n_substeps must be at least 1".to_owned()));
        }
        if self.max_episode_steps == 0 {
            return Err(EnvError::InvalidConfig(
                "max_episode_steps must be at least 1".to_owned(),
            ));
        }
        if let Some(init) = self
            .initial_qpos
            .iter()
            .find(|init| init.value.is_empty() || init.value.iter().any(|v| !v.is_finite()))
        {
            return Err(EnvError::InvalidConfig(format!(
                "initial position of `{}` must be non-empty and finite",
                init.joint
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for name in ["reach", "push", "pick_and_place", "pick-and-place"] {
            TaskConfig::preset(name).unwrap().validate().unwrap();
        }
        assert!(TaskConfig::preset("stack").is_none());
    }

    #[test]
    fn push_blocks_the_gripper_and_keeps_goals_on_the_table() {
        let push = TaskConfig::push();
        assert!(push.block_gripper && push.has_object && !push.target_in_the_air);
        assert_eq!(push.initial_qpos.last().unwrap().value.len(), 7);
    }

    #[test]
    fn json_round_trips_through_serde() {
        let config = TaskConfig::pick_and_place();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(TaskConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let json = r#"{
            "gripper_extra_height": 0.0,
            "block_gripper": false,
            "has_object": false,
            "target_in_the_air": true,
            "target_offset": [0.0, 0.0, 0.0],
            "obj_range": 0.1,
            "target_range": 0.1,
            "distance_threshold": 0.05,
            "initial_qpos": [{ "joint": "arm:slide_x", "value": [0.0] }],
            "reward_type": "dense"
        }"#;
        let config = TaskConfig::from_json(json).unwrap();
        assert_eq!(config.reward_type, RewardType::Dense);
        assert_eq!(config.n_substeps, 20);
        assert_eq!(config.max_episode_steps, 50);
        assert!(!config.domain_randomization);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = TaskConfig::reach();
        config.distance_threshold = -0.1;
        assert!(matches!(config.validate(), Err(EnvError::InvalidConfig(_))));

        let mut config = TaskConfig::reach();
        config.n_substeps = 0;
        assert!(config.validate().is_err());

        let mut config = TaskConfig::reach();
        config.initial_qpos.push(JointInit::new("arm:slide_x", &[f32::NAN]));
        assert!(config.validate().is_err());

        assert!(matches!(
            TaskConfig::from_json(r#"{ "block_gripper": true, "colour": 3 }"#),
            Err(EnvError::ConfigParse(_))
        ));
    }
}
