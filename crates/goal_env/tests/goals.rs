mod common;

use common::tabletop_sim;
use goal_env::{GoalTask, ManipulationTask, TaskConfig};

fn task(config: TaskConfig) -> ManipulationTask<sim::KinematicSim> {
    ManipulationTask::new(tabletop_sim(), config).unwrap()
}

fn draws(config: TaskConfig, n: usize) -> Vec<sim::Vec3> {
    let mut task = task(config);
    let mut rng = fastrand::Rng::with_seed(99);
    (0..n).map(|_| task.sample_goal(&mut rng)).collect()
}

#[test]
fn goals_without_an_object_float_above_the_table() {
    let goals = draws(TaskConfig::reach(), 1000);
    assert!(goals.iter().all(|g| g.z > 0.032 && g.z <= 0.032 + 0.25));
    assert!(goals.iter().all(|g| (g.x - 0.8).abs() <= 0.31 + 1e-5));
    assert!(goals.iter().all(|g| (g.y - 0.685).abs() <= 0.14 + 1e-5));
}

#[test]
fn push_goals_lie_on_the_table() {
    let goals = draws(TaskConfig::push(), 500);
    assert!(goals.iter().all(|g| g.z == 0.032));
}

#[test]
fn about_half_of_pick_goals_are_lifted() {
    let goals = draws(TaskConfig::pick_and_place(), 2000);
    let lifted = goals.iter().filter(|g| g.z > 0.032).count();
    assert!((800..1200).contains(&lifted), "{lifted} of 2000 lifted");
}

#[test]
fn consecutive_goals_are_independent_draws() {
    let goals = draws(TaskConfig::reach(), 200);
    let distinct = goals.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(distinct, 199);

    let mean_x = goals.iter().map(|g| g.x).sum::<f32>() / 200.0;
    let spread = goals.iter().map(|g| (g.x - mean_x).powi(2)).sum::<f32>() / 200.0;
    // Uniform over 0.62 m has variance 0.032.
    assert!(spread > 0.02 && spread < 0.045, "{spread}");
}
