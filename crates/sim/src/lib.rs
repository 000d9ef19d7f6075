#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Tabletop Simulation Layer
//!
//! This crate defines how manipulation tasks talk to a rigid-body simulator
//! and ships a small simulator that speaks that language.
//!
//! ## Key Components
//!
//! -   **[`Simulator`]:** the named-access contract (joints, sites, bodies,
//!     mocap targets, actuators, render fixtures) that task code is written
//!     against. All reads return owned copies.
//! -   **[`KinematicSim`]:** a reference implementation with a weld-driven end
//!     effector, servo fingers and free bodies that can be pushed and grasped.
//! -   **[`actuation`]:** helpers translating flat command vectors into
//!     actuator controls and mocap pose deltas.
//! -   **[`rotations`]:** quaternion, matrix and Euler conversions.
//!
//! ## Usage
//!
//! ```rust
//! use sim::{KinematicSim, Simulator, Vec3, QUAT_IDENTITY};
//!
//! let mut sim = KinematicSim::new(0.002);
//! sim.add_free_body("cube", "cube:joint", Vec3::new(0.0, 0.0, 0.5), QUAT_IDENTITY, 0.02)?;
//! for _ in 0..500 {
//!     sim.step();
//! }
//! let z = sim.joint_qpos("cube:joint")?[2];
//! assert!((z - 0.02).abs() < 1e-4);
//! # Ok::<(), sim::SimError>(())
//! ```

pub mod actuation;
pub mod backend;
mod builder;
pub mod error;
mod integrator;
pub mod kinematic;
pub mod model;
pub mod rotations;
pub mod types;

pub use backend::{ActuatorInfo, Fixture, GeomInfo, SimState, Simulator, WeldInfo};
pub use error::SimError;
pub use kinematic::KinematicSim;
pub use types::{Mat3, Quat, Vec3, QUAT_IDENTITY};
