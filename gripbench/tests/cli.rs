use clap::Parser;
use gripbench::app::{self, Cli, Command, PolicyKind, RunArgs, TaskArgs, TaskKind};
use goal_env::GoalTask;
use std::path::PathBuf;

fn run_args(task: TaskKind, policy: PolicyKind, episodes: usize) -> RunArgs {
    RunArgs {
        task: TaskArgs {
            task,
            config: None,
            scene: None,
            domain_randomization: false,
        },
        episodes,
        seed: 7,
        policy,
        capture: None,
        width: 32,
        height: 24,
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("gripbench-{name}-{}", std::process::id()))
}

#[test]
fn run_flags_parse() {
    let cli = Cli::try_parse_from([
        "gripbench",
        "run",
        "--task",
        "pick-and-place",
        "--episodes",
        "3",
        "--seed",
        "42",
        "--policy",
        "random",
        "--capture",
        "frames",
        "--domain-randomization",
    ])
    .unwrap();
    let Command::Run(args) = cli.command else {
        panic!("expected run");
    };
    assert_eq!(args.task.task, TaskKind::PickAndPlace);
    assert!(args.task.domain_randomization);
    assert_eq!(args.episodes, 3);
    assert_eq!(args.seed, 42);
    assert_eq!(args.policy, PolicyKind::Random);
    assert_eq!(args.capture, Some(PathBuf::from("frames")));
    assert_eq!((args.width, args.height), (320, 240));
}

#[test]
fn describe_defaults_to_reach() {
    let cli = Cli::try_parse_from(["gripbench", "describe"]).unwrap();
    let Command::Describe(args) = cli.command else {
        panic!("expected describe");
    };
    assert_eq!(args.task, TaskKind::Reach);
    assert!(args.config.is_none());
}

#[test]
fn unknown_task_is_rejected() {
    assert!(Cli::try_parse_from(["gripbench", "run", "--task", "stack"]).is_err());
}

#[test]
fn describe_reports_config_and_spaces() {
    let args = run_args(TaskKind::PickAndPlace, PolicyKind::Scripted, 0).task;
    let json: serde_json::Value = serde_json::from_str(&app::describe(&args).unwrap()).unwrap();
    assert_eq!(json["observation_space"]["observation"], 25);
    assert_eq!(json["observation_space"]["desired_goal"], 3);
    assert_eq!(json["action_size"], 4);
    assert_eq!(json["config"]["block_gripper"], false);

    let args = run_args(TaskKind::Reach, PolicyKind::Scripted, 0).task;
    let json: serde_json::Value = serde_json::from_str(&app::describe(&args).unwrap()).unwrap();
    assert_eq!(json["observation_space"]["observation"], 10);
}

#[test]
fn config_file_replaces_the_preset() {
    let dir = scratch_dir("config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("push.json");
    let mut config = goal_env::TaskConfig::push();
    config.max_episode_steps = 5;
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    let mut args = run_args(TaskKind::Reach, PolicyKind::Random, 2);
    args.task.config = Some(path);
    args.task.domain_randomization = true;
    let resolved = app::resolve_config(&args.task).unwrap();
    assert!(resolved.has_object && resolved.domain_randomization);

    let summary = app::play(&args).unwrap();
    assert!(summary.episodes.iter().all(|e| e.steps == 5));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn broken_config_file_names_the_path() {
    let mut args = run_args(TaskKind::Reach, PolicyKind::Random, 1).task;
    args.config = Some(PathBuf::from("/nonexistent/task.json"));
    let err = app::resolve_config(&args).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/task.json"));
}

#[test]
fn scripted_reach_solves_every_episode() {
    let summary = app::play(&run_args(TaskKind::Reach, PolicyKind::Scripted, 3)).unwrap();
    assert_eq!(summary.episodes.len(), 3);
    assert!(summary.episodes.iter().all(|e| e.steps == 50));
    assert!((summary.success_rate() - 1.0).abs() < f32::EPSILON);
    // Sparse rewards: only the approach steps cost anything.
    assert!(summary.episodes.iter().all(|e| e.episode_return > -50.0));
}

#[test]
fn random_policy_runs_full_episodes() {
    let summary = app::play(&run_args(TaskKind::PickAndPlace, PolicyKind::Random, 2)).unwrap();
    for report in &summary.episodes {
        assert_eq!(report.steps, 50);
        assert!((-50.0..=0.0).contains(&report.episode_return));
        assert!(report.frame.is_none());
    }
}

#[test]
fn capture_writes_one_png_per_episode() {
    let dir = scratch_dir("capture");
    let mut args = run_args(TaskKind::Push, PolicyKind::Scripted, 2);
    args.capture = Some(dir.clone());
    let summary = app::play(&args).unwrap();
    for (i, report) in summary.episodes.iter().enumerate() {
        let frame = report.frame.as_ref().unwrap();
        assert_eq!(frame, &dir.join(format!("episode_{i:04}.png")));
        assert!(frame.exists());
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn randomization_from_a_config_file_gets_a_surface() {
    let dir = scratch_dir("randomized");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("push.json");
    let mut config = goal_env::TaskConfig::push();
    config.domain_randomization = true;
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    let plain = app::run_env(&run_args(TaskKind::Push, PolicyKind::Random, 1)).unwrap();
    assert!(plain.task().surface().is_none());

    let mut args = run_args(TaskKind::Reach, PolicyKind::Random, 1);
    args.task.config = Some(path);
    let mut env = app::run_env(&args).unwrap();
    assert!(env.task().config().domain_randomization);
    assert!(env.task().surface().is_some());
    env.reset().unwrap();
    let frame = env.render().unwrap().unwrap();
    assert_eq!((frame.width(), frame.height()), (32, 24));
    std::fs::remove_dir_all(&dir).unwrap();
}
