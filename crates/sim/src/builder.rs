//! # Scene Builder
//!
//! Builder methods for assembling a [`KinematicSim`] model: bodies, joints,
//! sites, mocap targets, welds, actuators and render fixtures. Every method
//! that references another entity by name validates the reference and
//! returns the index of the new entity.

use crate::error::SimError;
use crate::model::{
    ActuatorModel, BodyKind, BodyModel, GeomModel, GraspModel, JointKind, JointModel,
    MocapModel, SiteModel, WeldModel,
};
use crate::types::{Quat, Vec3, QUAT_IDENTITY};
use crate::KinematicSim;

impl KinematicSim {
    fn ensure_unique(&self, what: &str, name: &str, taken: bool) -> Result<(), SimError> {
        if taken {
            return Err(SimError::InvalidModel(format!("duplicate {what} `{name}`")));
        }
        Ok(())
    }

    fn push_joint(&mut self, name: &str, kind: JointKind) -> Result<usize, SimError> {
        self.ensure_unique("joint", name, self.model.joint_id(name).is_some())?;
        let joint = JointModel {
            name: name.to_owned(),
            qpos_adr: self.model.nq,
            dof_adr: self.model.nv,
            kind,
        };
        self.model.nq += joint.kind.nq();
        self.model.nv += joint.kind.nv();
        self.model.joints.push(joint);
        self.resize_state();
        Ok(self.model.joints.len() - 1)
    }

    /// Add a scalar slide joint that is not attached to a body pose
    /// (fingers, for example).
    ///
    /// # Errors
    /// Duplicate joint names are rejected.
    pub fn add_slide_joint(
        &mut self,
        name: &str,
        range: Option<(f32, f32)>,
    ) -> Result<usize, SimError> {
        self.push_joint(name, JointKind::Slide { range })
    }

    /// Add a body fixed in the world.
    ///
    /// # Errors
    /// Duplicate body names are rejected.
    pub fn add_static_body(&mut self, name: &str, pos: Vec3, quat: Quat) -> Result<usize, SimError> {
        self.push_body(BodyModel {
            name: name.to_owned(),
            pos,
            quat,
            kind: BodyKind::Static,
        })
    }

    /// Add a body translated along x, y and z by three new slide joints.
    ///
    /// # Errors
    /// Duplicate body or joint names are rejected.
    pub fn add_cartesian_body(
        &mut self,
        name: &str,
        pos: Vec3,
        joint_names: [&str; 3],
        range: Option<(f32, f32)>,
    ) -> Result<usize, SimError> {
        self.ensure_unique("body", name, self.model.body_id(name).is_some())?;
        let mut joints = [0; 3];
        for (slot, joint_name) in joints.iter_mut().zip(joint_names) {
            *slot = self.push_joint(joint_name, JointKind::Slide { range })?;
        }
        self.push_body(BodyModel {
            name: name.to_owned(),
            pos,
            quat: QUAT_IDENTITY,
            kind: BodyKind::Cartesian { joints },
        })
    }

    /// Add a floating cube of the given half size, driven by a new free joint.
    ///
    /// # Errors
    /// Duplicate body or joint names are rejected.
    pub fn add_free_body(
        &mut self,
        name: &str,
        joint_name: &str,
        pos: Vec3,
        quat: Quat,
        half_size: f32,
    ) -> Result<usize, SimError> {
        self.ensure_unique("body", name, self.model.body_id(name).is_some())?;
        let joint = self.push_joint(joint_name, JointKind::Free)?;
        let adr = self.model.joints[joint].qpos_adr;
        self.data.qpos[adr..adr + 3].copy_from_slice(&pos.to_array());
        self.data.qpos[adr + 3..adr + 7].copy_from_slice(&quat);
        self.push_body(BodyModel {
            name: name.to_owned(),
            pos,
            quat,
            kind: BodyKind::Free { joint, half_size },
        })
    }

    fn push_body(&mut self, body: BodyModel) -> Result<usize, SimError> {
        self.ensure_unique("body", &body.name, self.model.body_id(&body.name).is_some())?;
        self.model.bodies.push(body);
        self.resize_state();
        Ok(self.model.bodies.len() - 1)
    }

    fn body_index(&self, name: &str) -> Result<usize, SimError> {
        self.model
            .body_id(name)
            .ok_or_else(|| SimError::UnknownBody(name.to_owned()))
    }

    /// Attach a site to a body at a body-relative position.
    ///
    /// # Errors
    /// Unknown bodies and duplicate site names are rejected.
    pub fn add_site(&mut self, name: &str, body: &str, pos: Vec3) -> Result<usize, SimError> {
        self.ensure_unique("site", name, self.model.site_id(name).is_some())?;
        let body = self.body_index(body)?;
        self.model.sites.push(SiteModel {
            name: name.to_owned(),
            body,
            pos,
            visual: None,
        });
        self.resize_state();
        Ok(self.model.sites.len() - 1)
    }

    /// Make a site visible to renderers as a marker of the given radius.
    ///
    /// # Errors
    /// Returns [`SimError::UnknownSite`] for an unknown name.
    pub fn set_site_visual(&mut self, name: &str, radius: f32, rgba: [f32; 4]) -> Result<(), SimError> {
        let id = self
            .model
            .site_id(name)
            .ok_or_else(|| SimError::UnknownSite(name.to_owned()))?;
        self.model.sites[id].visual = Some((radius, rgba));
        Ok(())
    }

    /// Add a kinematic mocap target.
    ///
    /// # Errors
    /// Duplicate mocap names are rejected.
    pub fn add_mocap(&mut self, name: &str, pos: Vec3, quat: Quat) -> Result<usize, SimError> {
        self.ensure_unique("mocap", name, self.model.mocap_id(name).is_some())?;
        self.model.mocaps.push(MocapModel {
            name: name.to_owned(),
            pos,
            quat,
        });
        self.data.mocap_pos.push(pos);
        self.data.mocap_quat.push(quat);
        Ok(self.model.mocaps.len() - 1)
    }

    /// Weld a cartesian body to a mocap target, holding `relpos` between them.
    ///
    /// # Errors
    /// Unknown names are rejected, as are bodies that are not cartesian.
    pub fn add_weld(&mut self, mocap: &str, body: &str, relpos: Vec3) -> Result<usize, SimError> {
        let mocap_id = self
            .model
            .mocap_id(mocap)
            .ok_or_else(|| SimError::UnknownMocap(mocap.to_owned()))?;
        let body_id = self.body_index(body)?;
        if !matches!(self.model.bodies[body_id].kind, BodyKind::Cartesian { .. }) {
            return Err(SimError::InvalidModel(format!(
                "weld target `{body}` must be a cartesian body"
            )));
        }
        self.model.welds.push(WeldModel {
            mocap: mocap_id,
            body: body_id,
            relpos,
        });
        self.data.weld_offsets.push(relpos);
        Ok(self.model.welds.len() - 1)
    }

    /// Add a position servo on a slide joint.
    ///
    /// # Errors
    /// Unknown joints and free joints are rejected.
    pub fn add_actuator(
        &mut self,
        name: &str,
        joint: &str,
        gain: f32,
        relative: bool,
        ctrl_range: (f32, f32),
    ) -> Result<usize, SimError> {
        let joint_id = self
            .model
            .joint_id(joint)
            .ok_or_else(|| SimError::UnknownJoint(joint.to_owned()))?;
        if self.model.joints[joint_id].kind == JointKind::Free {
            return Err(SimError::InvalidModel(format!(
                "actuator `{name}` cannot drive free joint `{joint}`"
            )));
        }
        self.model.actuators.push(ActuatorModel {
            name: name.to_owned(),
            joint: joint_id,
            gain,
            relative,
            ctrl_range,
        });
        let qpos = self.data.qpos[self.model.joints[joint_id].qpos_adr];
        self.data.ctrl.push(if relative { 0.0 } else { qpos });
        Ok(self.model.actuators.len() - 1)
    }

    /// Add a renderable sphere attached to a body.
    ///
    /// # Errors
    /// Unknown bodies are rejected.
    pub fn add_geom(
        &mut self,
        name: &str,
        body: &str,
        offset: Vec3,
        radius: f32,
        rgba: [f32; 4],
    ) -> Result<usize, SimError> {
        self.ensure_unique("geom", name, self.model.geoms.iter().any(|g| g.name == name))?;
        let body = self.body_index(body)?;
        self.model.geoms.push(GeomModel {
            name: name.to_owned(),
            body,
            offset,
            radius,
            rgba,
        });
        Ok(self.model.geoms.len() - 1)
    }

    pub fn add_camera(&mut self, name: &str, pos: Vec3) {
        self.model.cameras.push((name.to_owned(), pos));
    }

    pub fn add_light(&mut self, name: &str, pos: Vec3) {
        self.model.lights.push((name.to_owned(), pos));
    }

    /// Enable the two-finger grasp model.
    ///
    /// # Errors
    /// Unknown site or finger joint names are rejected.
    pub fn set_grasp(
        &mut self,
        site: &str,
        fingers: [&str; 2],
        radius: f32,
        aperture: f32,
        push_radius: f32,
    ) -> Result<(), SimError> {
        let site = self
            .model
            .site_id(site)
            .ok_or_else(|| SimError::UnknownSite(site.to_owned()))?;
        let mut ids = [0; 2];
        for (slot, finger) in ids.iter_mut().zip(fingers) {
            *slot = self
                .model
                .joint_id(finger)
                .ok_or_else(|| SimError::UnknownJoint(finger.to_owned()))?;
        }
        self.model.grasp = Some(GraspModel {
            site,
            fingers: ids,
            radius,
            aperture,
            push_radius,
        });
        Ok(())
    }

    /// Set the height of the surface free bodies rest on.
    pub fn set_support_height(&mut self, height: f32) {
        self.model.support_height = height;
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.model.gravity = gravity;
    }

    /// Set weld tracking gain (1/s) and the speed limit of welded bodies (m/s).
    pub fn set_weld_dynamics(&mut self, gain: f32, max_speed: f32) {
        self.model.weld_gain = gain;
        self.model.max_speed = max_speed;
    }
}
