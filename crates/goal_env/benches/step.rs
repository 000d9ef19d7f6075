use criterion::{black_box, criterion_group, criterion_main, Criterion};
use goal_env::{GoalEnv, ManipulationTask, TaskConfig};
use scene::Scene;

fn bench_env_step(c: &mut Criterion) {
    let sim = Scene::tabletop().unwrap().into_sim().unwrap();
    let task = ManipulationTask::new(sim, TaskConfig::pick_and_place()).unwrap();
    let mut env = GoalEnv::new(task, 0).unwrap();
    env.reset().unwrap();

    c.bench_function("pick_and_place_step", |b| {
        b.iter(|| {
            let result = env.step(black_box(&[0.1, -0.1, 0.0, 1.0])).unwrap();
            if result.truncated {
                env.reset().unwrap();
            }
            result.reward
        });
    });

    c.bench_function("pick_and_place_reset", |b| {
        b.iter(|| env.reset().unwrap());
    });
}

criterion_group!(benches, bench_env_step);
criterion_main!(benches);
