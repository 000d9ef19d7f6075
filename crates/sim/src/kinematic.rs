//! # Kinematic Tabletop Simulator
//!
//! [`KinematicSim`] is a small reference implementation of [`Simulator`]. It
//! models exactly what a tabletop manipulation task needs:
//!
//! -   an end effector translated by three slide joints and pulled toward a
//!     mocap target by a weld constraint,
//! -   position-servo finger joints,
//! -   free bodies that fall under gravity onto a support surface, get pushed
//!     aside by the grip site and can be grasped by closing the fingers.
//!
//! It is not a contact solver; it exists so the task layer can be driven
//! end-to-end without an external engine.

use crate::backend::{ActuatorInfo, Fixture, GeomInfo, SimState, Simulator, WeldInfo};
use crate::error::SimError;
use crate::integrator::{drive_actuators, integrate_free_bodies, resolve_gripper_contacts, track_welds};
use crate::model::{BodyKind, JointModel, Model};
use crate::rotations::{normalize_quat, quat2mat, mat_vec};
use crate::types::{Mat3, Quat, Vec3};

/// Mutable simulation state plus the quantities derived from it.
#[derive(Clone, Debug, Default)]
pub(crate) struct Data {
    pub time: f32,
    pub qpos: Vec<f32>,
    pub qvel: Vec<f32>,
    pub ctrl: Vec<f32>,
    pub mocap_pos: Vec<Vec3>,
    pub mocap_quat: Vec<Quat>,
    pub weld_offsets: Vec<Vec3>,
    pub grasp: Option<(usize, Vec3)>,
    pub prev_aperture: f32,

    pub body_xpos: Vec<Vec3>,
    pub body_xquat: Vec<Quat>,
    pub body_vel: Vec<Vec3>,
    pub body_angvel: Vec<Vec3>,
    pub site_xpos: Vec<Vec3>,
    pub site_xmat: Vec<Mat3>,
    pub site_velp: Vec<Vec3>,
    pub site_velr: Vec<Vec3>,
}

/// Reference tabletop simulator.
#[derive(Clone, Debug)]
pub struct KinematicSim {
    pub(crate) model: Model,
    pub(crate) data: Data,
}

impl KinematicSim {
    /// Create an empty simulator ticking at `timestep` seconds.
    #[must_use]
    pub fn new(timestep: f32) -> Self {
        Self {
            model: Model::new(timestep),
            data: Data::default(),
        }
    }

    /// Read-only view of the model.
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Simulated time in seconds.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.data.time
    }

    /// Name of the free body currently held by the fingers, if any.
    #[must_use]
    pub fn grasped(&self) -> Option<&str> {
        self.data
            .grasp
            .map(|(body, _)| self.model.bodies[body].name.as_str())
    }

    pub(crate) fn resize_state(&mut self) {
        self.data.qpos.resize(self.model.nq, 0.0);
        self.data.qvel.resize(self.model.nv, 0.0);
        let nbody = self.model.bodies.len();
        self.data.body_xpos.resize(nbody, Vec3::ZERO);
        self.data.body_xquat.resize(nbody, [1.0, 0.0, 0.0, 0.0]);
        self.data.body_vel.resize(nbody, Vec3::ZERO);
        self.data.body_angvel.resize(nbody, Vec3::ZERO);
        let nsite = self.model.sites.len();
        self.data.site_xpos.resize(nsite, Vec3::ZERO);
        self.data.site_xmat.resize(nsite, [[0.0; 3]; 3]);
        self.data.site_velp.resize(nsite, Vec3::ZERO);
        self.data.site_velr.resize(nsite, Vec3::ZERO);
    }

    fn joint(&self, name: &str) -> Result<&JointModel, SimError> {
        self.model
            .joint_id(name)
            .map(|id| &self.model.joints[id])
            .ok_or_else(|| SimError::UnknownJoint(name.to_owned()))
    }

    fn site(&self, name: &str) -> Result<usize, SimError> {
        self.model
            .site_id(name)
            .ok_or_else(|| SimError::UnknownSite(name.to_owned()))
    }

    fn mocap(&self, name: &str) -> Result<usize, SimError> {
        self.model
            .mocap_id(name)
            .ok_or_else(|| SimError::UnknownMocap(name.to_owned()))
    }

    /// Recompute body poses and velocities from joint state.
    pub(crate) fn forward_bodies(&mut self) {
        let Self { model, data } = self;
        for (i, body) in model.bodies.iter().enumerate() {
            match body.kind {
                BodyKind::Static => {
                    data.body_xpos[i] = body.pos;
                    data.body_xquat[i] = body.quat;
                    data.body_vel[i] = Vec3::ZERO;
                    data.body_angvel[i] = Vec3::ZERO;
                }
                BodyKind::Cartesian { joints } => {
                    let q = joints.map(|j| data.qpos[model.joints[j].qpos_adr]);
                    let v = joints.map(|j| data.qvel[model.joints[j].dof_adr]);
                    data.body_xpos[i] = body.pos + Vec3::from_array(q);
                    data.body_vel[i] = Vec3::from_array(v);
                    data.body_angvel[i] = Vec3::ZERO;
                    data.body_xquat[i] = model
                        .welds
                        .iter()
                        .find(|w| w.body == i)
                        .map_or(body.quat, |w| normalize_quat(data.mocap_quat[w.mocap]));
                }
                BodyKind::Free { joint, .. } => {
                    let q = model.joints[joint].qpos_adr;
                    let v = model.joints[joint].dof_adr;
                    data.body_xpos[i] = Vec3::new(data.qpos[q], data.qpos[q + 1], data.qpos[q + 2]);
                    data.body_xquat[i] = normalize_quat([
                        data.qpos[q + 3],
                        data.qpos[q + 4],
                        data.qpos[q + 5],
                        data.qpos[q + 6],
                    ]);
                    data.body_vel[i] = Vec3::new(data.qvel[v], data.qvel[v + 1], data.qvel[v + 2]);
                    data.body_angvel[i] =
                        Vec3::new(data.qvel[v + 3], data.qvel[v + 4], data.qvel[v + 5]);
                }
            }
        }
    }

    fn forward_sites(&mut self) {
        let Self { model, data } = self;
        for (i, site) in model.sites.iter().enumerate() {
            let rot = quat2mat(data.body_xquat[site.body]);
            let arm = mat_vec(&rot, site.pos);
            let angvel = data.body_angvel[site.body];
            data.site_xpos[i] = data.body_xpos[site.body] + arm;
            data.site_xmat[i] = rot;
            data.site_velp[i] = data.body_vel[site.body] + angvel.cross(arm);
            data.site_velr[i] = angvel;
        }
    }
}

impl Simulator for KinematicSim {
    fn timestep(&self) -> f32 {
        self.model.timestep
    }

    fn step(&mut self) {
        let dt = self.model.timestep;
        track_welds(&self.model, &mut self.data, dt);
        drive_actuators(&self.model, &mut self.data, dt);
        self.forward();
        integrate_free_bodies(&self.model, &mut self.data, dt);
        resolve_gripper_contacts(&self.model, &mut self.data, dt);
        self.data.time += dt;
        self.forward();
    }

    fn forward(&mut self) {
        self.forward_bodies();
        self.forward_sites();
    }

    fn get_state(&self) -> SimState {
        SimState {
            time: self.data.time,
            qpos: self.data.qpos.clone(),
            qvel: self.data.qvel.clone(),
            ctrl: self.data.ctrl.clone(),
            mocap_pos: self.data.mocap_pos.clone(),
            mocap_quat: self.data.mocap_quat.clone(),
            weld_offsets: self.data.weld_offsets.clone(),
            grasp: self.data.grasp,
            prev_aperture: self.data.prev_aperture,
        }
    }

    fn set_state(&mut self, state: &SimState) -> Result<(), SimError> {
        if state.qpos.len() != self.data.qpos.len() || state.qvel.len() != self.data.qvel.len() {
            return Err(SimError::StateMismatch("joint state size"));
        }
        if state.ctrl.len() != self.data.ctrl.len() {
            return Err(SimError::StateMismatch("control size"));
        }
        if state.mocap_pos.len() != self.data.mocap_pos.len()
            || state.mocap_quat.len() != self.data.mocap_quat.len()
        {
            return Err(SimError::StateMismatch("mocap count"));
        }
        if state.weld_offsets.len() != self.data.weld_offsets.len() {
            return Err(SimError::StateMismatch("weld count"));
        }
        self.data.time = state.time;
        self.data.qpos.clone_from(&state.qpos);
        self.data.qvel.clone_from(&state.qvel);
        self.data.ctrl.clone_from(&state.ctrl);
        self.data.mocap_pos.clone_from(&state.mocap_pos);
        self.data.mocap_quat.clone_from(&state.mocap_quat);
        self.data.weld_offsets.clone_from(&state.weld_offsets);
        self.data.grasp = state.grasp;
        self.data.prev_aperture = state.prev_aperture;
        Ok(())
    }

    fn joint_names(&self) -> Vec<String> {
        self.model.joints.iter().map(|j| j.name.clone()).collect()
    }

    fn joint_qpos(&self, name: &str) -> Result<Vec<f32>, SimError> {
        let joint = self.joint(name)?;
        let adr = joint.qpos_adr;
        Ok(self.data.qpos[adr..adr + joint.kind.nq()].to_vec())
    }

    fn set_joint_qpos(&mut self, name: &str, value: &[f32]) -> Result<(), SimError> {
        let joint = self.joint(name)?;
        let (adr, nq) = (joint.qpos_adr, joint.kind.nq());
        if value.len() != nq {
            return Err(SimError::ShapeMismatch {
                name: name.to_owned(),
                expected: nq,
                got: value.len(),
            });
        }
        self.data.qpos[adr..adr + nq].copy_from_slice(value);
        Ok(())
    }

    fn joint_qvel(&self, name: &str) -> Result<Vec<f32>, SimError> {
        let joint = self.joint(name)?;
        let adr = joint.dof_adr;
        Ok(self.data.qvel[adr..adr + joint.kind.nv()].to_vec())
    }

    fn set_joint_qvel(&mut self, name: &str, value: &[f32]) -> Result<(), SimError> {
        let joint = self.joint(name)?;
        let (adr, nv) = (joint.dof_adr, joint.kind.nv());
        if value.len() != nv {
            return Err(SimError::ShapeMismatch {
                name: name.to_owned(),
                expected: nv,
                got: value.len(),
            });
        }
        self.data.qvel[adr..adr + nv].copy_from_slice(value);
        Ok(())
    }

    fn site_names(&self) -> Vec<String> {
        self.model.sites.iter().map(|s| s.name.clone()).collect()
    }

    fn site_xpos(&self, name: &str) -> Result<Vec3, SimError> {
        Ok(self.data.site_xpos[self.site(name)?])
    }

    fn site_xmat(&self, name: &str) -> Result<Mat3, SimError> {
        Ok(self.data.site_xmat[self.site(name)?])
    }

    fn site_xvelp(&self, name: &str) -> Result<Vec3, SimError> {
        Ok(self.data.site_velp[self.site(name)?])
    }

    fn site_xvelr(&self, name: &str) -> Result<Vec3, SimError> {
        Ok(self.data.site_velr[self.site(name)?])
    }

    fn site_pos(&self, name: &str) -> Result<Vec3, SimError> {
        Ok(self.model.sites[self.site(name)?].pos)
    }

    fn set_site_pos(&mut self, name: &str, pos: Vec3) -> Result<(), SimError> {
        let id = self.site(name)?;
        self.model.sites[id].pos = pos;
        Ok(())
    }

    fn body_xpos(&self, name: &str) -> Result<Vec3, SimError> {
        if let Some(id) = self.model.body_id(name) {
            return Ok(self.data.body_xpos[id]);
        }
        self.mocap(name)
            .map(|id| self.data.mocap_pos[id])
            .map_err(|_| SimError::UnknownBody(name.to_owned()))
    }

    fn body_xquat(&self, name: &str) -> Result<Quat, SimError> {
        if let Some(id) = self.model.body_id(name) {
            return Ok(self.data.body_xquat[id]);
        }
        self.mocap(name)
            .map(|id| self.data.mocap_quat[id])
            .map_err(|_| SimError::UnknownBody(name.to_owned()))
    }

    fn mocap_names(&self) -> Vec<String> {
        self.model.mocaps.iter().map(|m| m.name.clone()).collect()
    }

    fn mocap_pos(&self, name: &str) -> Result<Vec3, SimError> {
        Ok(self.data.mocap_pos[self.mocap(name)?])
    }

    fn mocap_quat(&self, name: &str) -> Result<Quat, SimError> {
        Ok(self.data.mocap_quat[self.mocap(name)?])
    }

    fn set_mocap_pos(&mut self, name: &str, pos: Vec3) -> Result<(), SimError> {
        let id = self.mocap(name)?;
        self.data.mocap_pos[id] = pos;
        Ok(())
    }

    fn set_mocap_quat(&mut self, name: &str, quat: Quat) -> Result<(), SimError> {
        let id = self.mocap(name)?;
        self.data.mocap_quat[id] = normalize_quat(quat);
        Ok(())
    }

    fn welds(&self) -> Vec<WeldInfo> {
        self.model
            .welds
            .iter()
            .map(|w| WeldInfo {
                mocap: self.model.mocaps[w.mocap].name.clone(),
                body: self.model.bodies[w.body].name.clone(),
            })
            .collect()
    }

    fn reset_welds(&mut self) {
        self.data.weld_offsets.fill(Vec3::ZERO);
    }

    fn actuators(&self) -> Vec<ActuatorInfo> {
        self.model
            .actuators
            .iter()
            .map(|a| ActuatorInfo {
                name: a.name.clone(),
                joint: self.model.joints[a.joint].name.clone(),
                relative: a.relative,
            })
            .collect()
    }

    fn set_ctrl(&mut self, index: usize, value: f32) -> Result<(), SimError> {
        let slot = self
            .data
            .ctrl
            .get_mut(index)
            .ok_or(SimError::UnknownActuator(index))?;
        *slot = value;
        Ok(())
    }

    fn geoms(&self) -> Vec<GeomInfo> {
        self.model
            .geoms
            .iter()
            .map(|g| {
                let rot = quat2mat(self.data.body_xquat[g.body]);
                GeomInfo {
                    name: g.name.clone(),
                    pos: self.data.body_xpos[g.body] + mat_vec(&rot, g.offset),
                    radius: g.radius,
                    rgba: g.rgba,
                }
            })
            .collect()
    }

    fn visible_sites(&self) -> Vec<GeomInfo> {
        self.model
            .sites
            .iter()
            .enumerate()
            .filter_map(|(i, site)| {
                site.visual.map(|(radius, rgba)| GeomInfo {
                    name: site.name.clone(),
                    pos: self.data.site_xpos[i],
                    radius,
                    rgba,
                })
            })
            .collect()
    }

    fn cameras(&self) -> Vec<Fixture> {
        self.model
            .cameras
            .iter()
            .map(|(name, pos)| Fixture {
                name: name.clone(),
                pos: *pos,
            })
            .collect()
    }

    fn lights(&self) -> Vec<Fixture> {
        self.model
            .lights
            .iter()
            .map(|(name, pos)| Fixture {
                name: name.clone(),
                pos: *pos,
            })
            .collect()
    }
}
