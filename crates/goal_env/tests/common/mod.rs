#![allow(dead_code)]

use goal_env::{GoalEnv, ManipulationTask, TaskConfig};
use render::HeadlessSurface;
use scene::Scene;
use sim::{KinematicSim, Vec3};

pub type TabletopEnv = GoalEnv<ManipulationTask<KinematicSim>>;

pub fn tabletop_sim() -> KinematicSim {
    Scene::tabletop().unwrap().into_sim().unwrap()
}

pub fn tabletop_env(config: TaskConfig, seed: u64) -> TabletopEnv {
    let task = ManipulationTask::new(tabletop_sim(), config).unwrap();
    GoalEnv::new(task, seed).unwrap()
}

pub fn rendered_env(config: TaskConfig, seed: u64) -> TabletopEnv {
    let sim = tabletop_sim();
    let surface = HeadlessSurface::new(&sim, 64, 48).unwrap();
    let task = ManipulationTask::new(sim, config)
        .unwrap()
        .with_surface(Box::new(surface))
        .unwrap();
    GoalEnv::new(task, seed).unwrap()
}

/// Proportional action toward `target` with the given gripper command.
pub fn toward(from: Vec3, target: Vec3, gripper: f32) -> [f32; 4] {
    let d = (target - from) * (1.0 / 0.05);
    [d.x, d.y, d.z, gripper]
}
