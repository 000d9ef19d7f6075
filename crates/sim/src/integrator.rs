//! # Kinematic Integration
//!
//! Per-tick update passes of [`KinematicSim`](crate::KinematicSim): weld
//! tracking, servo actuation, free-body integration and gripper contacts.
//! Each pass reads the model and mutates joint state in place; derived
//! quantities are refreshed by `forward` afterwards.

use crate::kinematic::Data;
use crate::model::{BodyKind, JointKind, Model};
use crate::types::Vec3;

/// Offset from the support surface below which a body counts as resting.
const REST_EPSILON: f32 = 1e-6;

fn clamp_to_range(kind: &JointKind, value: f32) -> f32 {
    match kind {
        JointKind::Slide { range: Some((lo, hi)) } => value.clamp(*lo, *hi),
        _ => value,
    }
}

fn free_pos(data: &Data, adr: usize) -> Vec3 {
    Vec3::new(data.qpos[adr], data.qpos[adr + 1], data.qpos[adr + 2])
}

fn set_free_pos(data: &mut Data, adr: usize, pos: Vec3) {
    data.qpos[adr..adr + 3].copy_from_slice(&pos.to_array());
}

fn set_free_vel(data: &mut Data, dof: usize, linear: Vec3, angular: Vec3) {
    data.qvel[dof..dof + 3].copy_from_slice(&linear.to_array());
    data.qvel[dof + 3..dof + 6].copy_from_slice(&angular.to_array());
}

/// Pull every welded cartesian body toward its mocap target.
pub(crate) fn track_welds(model: &Model, data: &mut Data, dt: f32) {
    for (w, weld) in model.welds.iter().enumerate() {
        let body = &model.bodies[weld.body];
        let BodyKind::Cartesian { joints } = body.kind else {
            continue;
        };
        let q = joints.map(|j| data.qpos[model.joints[j].qpos_adr]);
        let current = body.pos + Vec3::from_array(q);
        let target = data.mocap_pos[weld.mocap] + data.weld_offsets[w];

        let mut vel = (target - current) * model.weld_gain;
        if vel.length() > model.max_speed {
            vel = vel.normalize() * model.max_speed;
        }

        for (axis, &j) in joints.iter().enumerate() {
            let joint = &model.joints[j];
            let next = clamp_to_range(&joint.kind, q[axis] + vel[axis] * dt);
            data.qvel[joint.dof_adr] = (next - q[axis]) / dt;
            data.qpos[joint.qpos_adr] = next;
        }
    }
}

/// First-order position servos toward the control targets.
pub(crate) fn drive_actuators(model: &Model, data: &mut Data, dt: f32) {
    for (a, actuator) in model.actuators.iter().enumerate() {
        let joint = &model.joints[actuator.joint];
        let (lo, hi) = actuator.ctrl_range;
        let target = data.ctrl[a].clamp(lo, hi);
        let q = data.qpos[joint.qpos_adr];
        // Never overshoot the target within one tick.
        let rate = (actuator.gain * dt).min(1.0);
        let next = clamp_to_range(&joint.kind, q + (target - q) * rate);
        data.qvel[joint.dof_adr] = (next - q) / dt;
        data.qpos[joint.qpos_adr] = next;
    }
}

/// Gravity, support contact and spin for free bodies not held by the fingers.
pub(crate) fn integrate_free_bodies(model: &Model, data: &mut Data, dt: f32) {
    for (i, body) in model.bodies.iter().enumerate() {
        let BodyKind::Free { joint, half_size } = body.kind else {
            continue;
        };
        if data.grasp.is_some_and(|(held, _)| held == i) {
            continue;
        }
        let adr = model.joints[joint].qpos_adr;
        let dof = model.joints[joint].dof_adr;

        let mut vel = Vec3::new(data.qvel[dof], data.qvel[dof + 1], data.qvel[dof + 2]);
        let mut angvel = Vec3::new(data.qvel[dof + 3], data.qvel[dof + 4], data.qvel[dof + 5]);
        let mut pos = free_pos(data, adr);
        let floor = model.support_height + half_size;

        if pos.z <= floor + REST_EPSILON && vel.z <= 0.0 {
            // Resting contact: no bounce, full friction.
            pos.z = floor;
            vel = Vec3::ZERO;
            angvel = Vec3::ZERO;
        } else {
            vel += model.gravity * dt;
            pos += vel * dt;
            if pos.z <= floor {
                pos.z = floor;
                vel = Vec3::ZERO;
                angvel = Vec3::ZERO;
            } else if angvel.length() > 0.0 {
                let quat = glam::Quat::from_xyzw(
                    data.qpos[adr + 4],
                    data.qpos[adr + 5],
                    data.qpos[adr + 6],
                    data.qpos[adr + 3],
                );
                let spin = glam::Quat::from_scaled_axis(glam::Vec3::new(angvel.x, angvel.y, angvel.z) * dt);
                let next = (spin * quat).normalize();
                data.qpos[adr + 3..adr + 7].copy_from_slice(&[next.w, next.x, next.y, next.z]);
            }
        }

        set_free_pos(data, adr, pos);
        set_free_vel(data, dof, vel, angvel);
    }
}

/// Grasp, release and push interactions between the grip site and free bodies.
///
/// A body is caught when the fingers close (aperture crosses below the grasp
/// threshold) while the grip site is within the grasp radius; it is released
/// as soon as the fingers open again. While the fingers are closed, bodies
/// that are not held are kept at least `push_radius` away from the grip site
/// horizontally whenever the grip site is level with them.
pub(crate) fn resolve_gripper_contacts(model: &Model, data: &mut Data, dt: f32) {
    let Some(grasp) = &model.grasp else {
        return;
    };
    let grip = data.site_xpos[grasp.site];
    let grip_vel = data.site_velp[grasp.site];
    let [left, right] = grasp.fingers.map(|j| data.qpos[model.joints[j].qpos_adr]);
    let aperture = left - right;

    if data.grasp.is_some() && aperture >= grasp.aperture {
        tracing::debug!(aperture, "fingers opened, releasing body");
        data.grasp = None;
    }

    let closing = aperture < grasp.aperture && data.prev_aperture >= grasp.aperture;
    for (i, body) in model.bodies.iter().enumerate() {
        let BodyKind::Free { joint, half_size } = body.kind else {
            continue;
        };
        let adr = model.joints[joint].qpos_adr;
        let dof = model.joints[joint].dof_adr;
        let pos = free_pos(data, adr);

        match data.grasp {
            Some((held, offset)) if held == i => {
                set_free_pos(data, adr, grip + offset);
                set_free_vel(data, dof, grip_vel, Vec3::ZERO);
                continue;
            }
            Some(_) => continue,
            None => {}
        }

        if closing && pos.distance(grip) < grasp.radius {
            tracing::debug!(body = %body.name, "fingers closed on body");
            data.grasp = Some((i, pos - grip));
            set_free_vel(data, dof, grip_vel, Vec3::ZERO);
            continue;
        }

        let dx = pos.x - grip.x;
        let dy = pos.y - grip.y;
        let horizontal = (dx * dx + dy * dy).sqrt();
        // Open fingers straddle the body; only closed ones push it.
        let closed = aperture < grasp.aperture;
        if closed && horizontal < grasp.push_radius && (grip.z - pos.z).abs() < half_size {
            let (ux, uy) = if horizontal > 1e-6 {
                (dx / horizontal, dy / horizontal)
            } else {
                (1.0, 0.0)
            };
            let pushed = Vec3::new(
                grip.x + ux * grasp.push_radius,
                grip.y + uy * grasp.push_radius,
                pos.z,
            );
            let vel = Vec3::new((pushed.x - pos.x) / dt, (pushed.y - pos.y) / dt, data.qvel[dof + 2]);
            set_free_pos(data, adr, pushed);
            set_free_vel(data, dof, vel, Vec3::ZERO);
        }
    }
    data.prev_aperture = aperture;
}
