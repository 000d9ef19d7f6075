#![deny(clippy::all, clippy::pedantic)]
//! JSON scene descriptions for the kinematic simulator.
//!
//! A [`Scene`] lists bodies, joints, sites, mocap targets, welds, actuators
//! and render fixtures by name; [`Scene::into_sim`] resolves the names and
//! builds a [`KinematicSim`]. [`Scene::tabletop`] is the built-in arm, table
//! and cube scene used by the manipulation tasks.

use anyhow::{Context, Result};
use serde::Deserialize;
use sim::{KinematicSim, Simulator, Vec3};
use std::path::Path;

const TABLETOP_JSON: &str = include_str!("../assets/tabletop.json");

#[derive(Deserialize, Debug, Clone)]
pub struct Scene {
    #[serde(default = "default_timestep")]
    pub timestep: f32,
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 3],
    #[serde(default)]
    pub support_height: f32,
    #[serde(default)]
    pub weld: Option<WeldDynamics>,
    pub bodies: Vec<Body>,
    #[serde(default)]
    pub joints: Vec<JointDef>,
    #[serde(default)]
    pub sites: Vec<SiteDef>,
    #[serde(default)]
    pub mocaps: Vec<MocapDef>,
    #[serde(default)]
    pub welds: Vec<WeldDef>,
    #[serde(default)]
    pub actuators: Vec<ActuatorDef>,
    #[serde(default)]
    pub geoms: Vec<GeomDef>,
    #[serde(default)]
    pub cameras: Vec<FixtureDef>,
    #[serde(default)]
    pub lights: Vec<FixtureDef>,
    #[serde(default)]
    pub grasp: Option<GraspDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WeldDynamics {
    pub gain: f32,
    pub max_speed: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind")]
pub enum Body {
    #[serde(rename = "static")]
    Static {
        name: String,
        pos: [f32; 3],
        #[serde(default = "identity_quat")]
        quat: [f32; 4],
    },
    #[serde(rename = "cartesian")]
    Cartesian {
        name: String,
        pos: [f32; 3],
        joints: [String; 3],
        #[serde(default)]
        range: Option<[f32; 2]>,
    },
    #[serde(rename = "free")]
    Free {
        name: String,
        joint: String,
        pos: [f32; 3],
        #[serde(default = "identity_quat")]
        quat: [f32; 4],
        half_size: f32,
    },
}

/// A standalone slide joint (fingers).
#[derive(Deserialize, Debug, Clone)]
pub struct JointDef {
    pub name: String,
    #[serde(default)]
    pub range: Option<[f32; 2]>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SiteDef {
    pub name: String,
    pub body: String,
    #[serde(default)]
    pub pos: [f32; 3],
    /// Marker radius; the site is invisible without one.
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default = "default_rgba")]
    pub rgba: [f32; 4],
}

#[derive(Deserialize, Debug, Clone)]
pub struct MocapDef {
    pub name: String,
    pub pos: [f32; 3],
    #[serde(default = "identity_quat")]
    pub quat: [f32; 4],
}

#[derive(Deserialize, Debug, Clone)]
pub struct WeldDef {
    pub mocap: String,
    pub body: String,
    #[serde(default)]
    pub relpos: [f32; 3],
}

#[derive(Deserialize, Debug, Clone)]
pub struct ActuatorDef {
    pub name: String,
    pub joint: String,
    pub gain: f32,
    #[serde(default)]
    pub relative: bool,
    pub ctrl_range: [f32; 2],
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeomDef {
    pub name: String,
    pub body: String,
    #[serde(default)]
    pub offset: [f32; 3],
    pub radius: f32,
    #[serde(default = "default_rgba")]
    pub rgba: [f32; 4],
}

#[derive(Deserialize, Debug, Clone)]
pub struct FixtureDef {
    pub name: String,
    pub pos: [f32; 3],
}

#[derive(Deserialize, Debug, Clone)]
pub struct GraspDef {
    pub site: String,
    pub fingers: [String; 2],
    pub radius: f32,
    pub aperture: f32,
    pub push_radius: f32,
}

fn default_timestep() -> f32 {
    0.002
}

fn default_gravity() -> [f32; 3] {
    [0.0, 0.0, -9.81]
}

fn identity_quat() -> [f32; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

fn default_rgba() -> [f32; 4] {
    [0.5, 0.5, 0.5, 1.0]
}

fn range(r: Option<[f32; 2]>) -> Option<(f32, f32)> {
    r.map(|[lo, hi]| (lo, hi))
}

impl Scene {
    /// Parse a scene from JSON text.
    ///
    /// # Errors
    /// Returns the JSON error for malformed input.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a scene file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_str(&json).with_context(|| format!("parsing scene {}", path.display()))
    }

    /// The built-in tabletop scene: a cartesian gripper welded to
    /// `arm:mocap`, two servo fingers, a table and the cube `object0`.
    ///
    /// # Errors
    /// Only fails if the embedded asset is corrupt.
    pub fn tabletop() -> Result<Self> {
        Self::from_str(TABLETOP_JSON).context("parsing built-in tabletop scene")
    }

    /// Build a simulator from this description.
    ///
    /// # Errors
    /// Returns an error naming the first unresolved or duplicate reference.
    pub fn into_sim(self) -> Result<KinematicSim> {
        if self.timestep <= 0.0 {
            anyhow::bail!("timestep must be positive, got {}", self.timestep);
        }
        let mut sim = KinematicSim::new(self.timestep);
        sim.set_gravity(Vec3::from_array(self.gravity));
        sim.set_support_height(self.support_height);
        if let Some(weld) = &self.weld {
            sim.set_weld_dynamics(weld.gain, weld.max_speed);
        }

        for body in self.bodies {
            match body {
                Body::Static { name, pos, quat } => {
                    sim.add_static_body(&name, Vec3::from_array(pos), quat)
                        .with_context(|| format!("body {name}"))?;
                }
                Body::Cartesian {
                    name,
                    pos,
                    joints,
                    range: r,
                } => {
                    let [x, y, z] = &joints;
                    let joints = [x.as_str(), y.as_str(), z.as_str()];
                    sim.add_cartesian_body(&name, Vec3::from_array(pos), joints, range(r))
                        .with_context(|| format!("body {name}"))?;
                }
                Body::Free {
                    name,
                    joint,
                    pos,
                    quat,
                    half_size,
                } => {
                    sim.add_free_body(&name, &joint, Vec3::from_array(pos), quat, half_size)
                        .with_context(|| format!("body {name}"))?;
                }
            }
        }

        for joint in self.joints {
            sim.add_slide_joint(&joint.name, range(joint.range))
                .with_context(|| format!("joint {}", joint.name))?;
        }

        for site in self.sites {
            sim.add_site(&site.name, &site.body, Vec3::from_array(site.pos))
                .with_context(|| format!("site {}", site.name))?;
            if let Some(size) = site.size {
                sim.set_site_visual(&site.name, size, site.rgba)?;
            }
        }

        for mocap in self.mocaps {
            sim.add_mocap(&mocap.name, Vec3::from_array(mocap.pos), mocap.quat)
                .with_context(|| format!("mocap {}", mocap.name))?;
        }

        for weld in self.welds {
            sim.add_weld(&weld.mocap, &weld.body, Vec3::from_array(weld.relpos))
                .with_context(|| format!("weld {} -> {}", weld.mocap, weld.body))?;
        }

        for act in self.actuators {
            let [lo, hi] = act.ctrl_range;
            sim.add_actuator(&act.name, &act.joint, act.gain, act.relative, (lo, hi))
                .with_context(|| format!("actuator {}", act.name))?;
        }

        for geom in self.geoms {
            sim.add_geom(
                &geom.name,
                &geom.body,
                Vec3::from_array(geom.offset),
                geom.radius,
                geom.rgba,
            )
            .with_context(|| format!("geom {}", geom.name))?;
        }

        for camera in self.cameras {
            sim.add_camera(&camera.name, Vec3::from_array(camera.pos));
        }
        for light in self.lights {
            sim.add_light(&light.name, Vec3::from_array(light.pos));
        }

        if let Some(grasp) = self.grasp {
            let [left, right] = &grasp.fingers;
            sim.set_grasp(
                &grasp.site,
                [left.as_str(), right.as_str()],
                grasp.radius,
                grasp.aperture,
                grasp.push_radius,
            )
            .context("grasp")?;
        }

        sim.forward();
        Ok(sim)
    }
}
