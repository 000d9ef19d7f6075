//! Low-level helpers that turn flat command vectors into actuator controls
//! and mocap targets.
//!
//! A command vector starts with seven entries per mocap body (position delta
//! followed by quaternion delta), then one entry per actuator.

use crate::backend::Simulator;
use crate::error::SimError;
use crate::types::Vec3;

const MOCAP_WIDTH: usize = 7;

fn mocap_prefix<S: Simulator + ?Sized>(sim: &S) -> usize {
    sim.mocap_names().len() * MOCAP_WIDTH
}

/// Write actuator control targets from the tail of `action`.
///
/// Absolute actuators receive the value as is; relative actuators receive it
/// as an offset from the current position of their joint. Missing entries
/// leave the corresponding actuator untouched.
///
/// # Errors
/// Propagates lookup failures for actuator joints.
pub fn ctrl_set_action<S: Simulator + ?Sized>(sim: &mut S, action: &[f32]) -> Result<(), SimError> {
    let controls = action.get(mocap_prefix(sim)..).unwrap_or(&[]);
    for (i, (actuator, &value)) in sim.actuators().iter().zip(controls).enumerate() {
        let target = if actuator.relative {
            sim.joint_qpos(&actuator.joint)?[0] + value
        } else {
            value
        };
        sim.set_ctrl(i, target)?;
    }
    Ok(())
}

/// Move every mocap body by the deltas at the head of `action`.
///
/// Mocap bodies are first snapped onto the bodies they are welded to, so the
/// delta is applied relative to where the end effector actually is.
///
/// # Errors
/// Returns [`SimError::ShapeMismatch`] when `action` is too short to hold a
/// pose delta for every mocap body.
pub fn mocap_set_action<S: Simulator + ?Sized>(sim: &mut S, action: &[f32]) -> Result<(), SimError> {
    let names = sim.mocap_names();
    if names.is_empty() {
        return Ok(());
    }
    let needed = names.len() * MOCAP_WIDTH;
    if action.len() < needed {
        return Err(SimError::ShapeMismatch {
            name: "mocap action".to_owned(),
            expected: needed,
            got: action.len(),
        });
    }
    reset_mocap2body_xpos(sim)?;
    for (name, delta) in names.iter().zip(action.chunks_exact(MOCAP_WIDTH)) {
        let pos = sim.mocap_pos(name)? + Vec3::new(delta[0], delta[1], delta[2]);
        let quat = sim.mocap_quat(name)?;
        sim.set_mocap_pos(name, pos)?;
        sim.set_mocap_quat(
            name,
            [
                quat[0] + delta[3],
                quat[1] + delta[4],
                quat[2] + delta[5],
                quat[3] + delta[6],
            ],
        )?;
    }
    Ok(())
}

/// Clear the relative pose of every mocap weld so welded bodies sit exactly
/// on their targets, then refresh derived quantities.
pub fn reset_mocap_welds<S: Simulator + ?Sized>(sim: &mut S) {
    sim.reset_welds();
    sim.forward();
}

/// Snap every welded mocap body onto the current pose of its body.
///
/// # Errors
/// Propagates lookup failures for weld endpoints.
pub fn reset_mocap2body_xpos<S: Simulator + ?Sized>(sim: &mut S) -> Result<(), SimError> {
    for weld in sim.welds() {
        let pos = sim.body_xpos(&weld.body)?;
        let quat = sim.body_xquat(&weld.body)?;
        sim.set_mocap_pos(&weld.mocap, pos)?;
        sim.set_mocap_quat(&weld.mocap, quat)?;
    }
    Ok(())
}

/// Positions and velocities of the joints whose names start with `prefix`,
/// concatenated in model order.
///
/// # Errors
/// Propagates joint lookup failures.
pub fn robot_get_obs<S: Simulator + ?Sized>(
    sim: &S,
    prefix: &str,
) -> Result<(Vec<f32>, Vec<f32>), SimError> {
    let mut qpos = Vec::new();
    let mut qvel = Vec::new();
    for name in sim.joint_names().iter().filter(|n| n.starts_with(prefix)) {
        qpos.extend(sim.joint_qpos(name)?);
        qvel.extend(sim.joint_qvel(name)?);
    }
    Ok((qpos, qvel))
}
