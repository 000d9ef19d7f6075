//! Static description of a kinematic tabletop scene.
//!
//! The model is assembled through the builder methods on
//! [`KinematicSim`](crate::KinematicSim) and is not edited afterwards, apart
//! from site positions which the renderer-facing callbacks are allowed to
//! move.

use crate::types::{Quat, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub enum JointKind {
    /// One translational degree of freedom with optional limits.
    Slide { range: Option<(f32, f32)> },
    /// Six degrees of freedom: 7 position entries (xyz + wxyz), 6 velocity entries.
    Free,
}

impl JointKind {
    #[must_use]
    pub const fn nq(&self) -> usize {
        match self {
            Self::Slide { .. } => 1,
            Self::Free => 7,
        }
    }

    #[must_use]
    pub const fn nv(&self) -> usize {
        match self {
            Self::Slide { .. } => 1,
            Self::Free => 6,
        }
    }
}

#[derive(Clone, Debug)]
pub struct JointModel {
    pub name: String,
    pub kind: JointKind,
    pub qpos_adr: usize,
    pub dof_adr: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BodyKind {
    /// Fixed in the world.
    Static,
    /// Translated from its base position by three slide joints (x, y, z).
    Cartesian { joints: [usize; 3] },
    /// Floating body driven by a free joint, resting on the support surface.
    Free { joint: usize, half_size: f32 },
}

#[derive(Clone, Debug)]
pub struct BodyModel {
    pub name: String,
    pub pos: Vec3,
    pub quat: Quat,
    pub kind: BodyKind,
}

#[derive(Clone, Debug)]
pub struct SiteModel {
    pub name: String,
    pub body: usize,
    pub pos: Vec3,
    /// Marker radius and colour when the site is drawn.
    pub visual: Option<(f32, [f32; 4])>,
}

#[derive(Clone, Debug)]
pub struct MocapModel {
    pub name: String,
    pub pos: Vec3,
    pub quat: Quat,
}

#[derive(Clone, Debug)]
pub struct WeldModel {
    pub mocap: usize,
    pub body: usize,
    /// Relative position held by the constraint until it is reset.
    pub relpos: Vec3,
}

#[derive(Clone, Debug)]
pub struct ActuatorModel {
    pub name: String,
    pub joint: usize,
    /// Servo gain in 1/s.
    pub gain: f32,
    pub relative: bool,
    pub ctrl_range: (f32, f32),
}

#[derive(Clone, Debug)]
pub struct GeomModel {
    pub name: String,
    pub body: usize,
    pub offset: Vec3,
    pub radius: f32,
    pub rgba: [f32; 4],
}

/// Parameters of the two-finger grasp model.
#[derive(Clone, Debug)]
pub struct GraspModel {
    /// Site the grasped body follows.
    pub site: usize,
    /// Left and right finger joints; the aperture is `left - right`.
    pub fingers: [usize; 2],
    /// Maximum grip-to-object distance at which closing fingers catch the object.
    pub radius: f32,
    /// Aperture below which the fingers count as closed.
    pub aperture: f32,
    /// Horizontal clearance enforced between the grip site and a free body.
    pub push_radius: f32,
}

#[derive(Clone, Debug)]
pub struct Model {
    pub timestep: f32,
    pub gravity: Vec3,
    /// Height of the surface free bodies rest on.
    pub support_height: f32,
    /// Weld tracking gain in 1/s.
    pub weld_gain: f32,
    /// Speed limit for weld-driven bodies in m/s.
    pub max_speed: f32,
    pub joints: Vec<JointModel>,
    pub bodies: Vec<BodyModel>,
    pub sites: Vec<SiteModel>,
    pub mocaps: Vec<MocapModel>,
    pub welds: Vec<WeldModel>,
    pub actuators: Vec<ActuatorModel>,
    pub geoms: Vec<GeomModel>,
    pub cameras: Vec<(String, Vec3)>,
    pub lights: Vec<(String, Vec3)>,
    pub grasp: Option<GraspModel>,
    pub nq: usize,
    pub nv: usize,
}

impl Model {
    #[must_use]
    pub fn new(timestep: f32) -> Self {
        Self {
            timestep,
            gravity: Vec3::new(0.0, 0.0, -9.81),
            support_height: 0.0,
            weld_gain: 50.0,
            max_speed: 2.0,
            joints: Vec::new(),
            bodies: Vec::new(),
            sites: Vec::new(),
            mocaps: Vec::new(),
            welds: Vec::new(),
            actuators: Vec::new(),
            geoms: Vec::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
            grasp: None,
            nq: 0,
            nv: 0,
        }
    }

    pub(crate) fn joint_id(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    pub(crate) fn body_id(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name == name)
    }

    pub(crate) fn site_id(&self, name: &str) -> Option<usize> {
        self.sites.iter().position(|s| s.name == name)
    }

    pub(crate) fn mocap_id(&self, name: &str) -> Option<usize> {
        self.mocaps.iter().position(|m| m.name == name)
    }
}
