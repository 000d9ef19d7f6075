#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # gripbench: Goal-Conditioned Gripper Benchmarks
//!
//! Entry point for both the documentation and the `gripbench` binary.
//!
//! ## Overview
//!
//! A mocap-driven two-finger gripper works over a table. Three task presets
//! share one environment: **reach** a point in space, **push** a block to a
//! spot on the table, and **pick and place** the block at a point that may
//! float above it. Episodes are goal-conditioned: every observation carries
//! the achieved and the desired goal, and rewards are recomputed from them.
//!
//! ### The Crates
//!
//! -   **[`sim`]:** the [`Simulator`](sim::Simulator) trait and a kinematic
//!     implementation with mocap welds, relative actuators and grasping.
//! -   **[`scene`]:** JSON scene descriptions, including the built-in
//!     tabletop.
//! -   **[`render`]:** the [`RenderSurface`](render::RenderSurface) trait and
//!     a CPU offscreen renderer with PNG output.
//! -   **[`goal_env`]:** task configuration, the manipulation task and the
//!     episode driver.
//!
//! ## Command Line
//!
//! ```text
//! gripbench run --task pick-and-place --episodes 20 --capture frames/
//! gripbench describe --task push
//! ```

pub mod app;
pub mod policy;

pub use goal_env;
pub use render;
pub use scene;
pub use sim;
