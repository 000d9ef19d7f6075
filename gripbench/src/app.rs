//! # Command-Line Front End
//!
//! `gripbench run` plays episodes of one of the tasks with a baseline policy
//! and reports the success rate; `gripbench describe` prints the resolved task
//! configuration and observation space as JSON.

use crate::policy::{Policy, RandomPolicy, ScriptedPolicy};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use goal_env::{GoalEnv, GoalTask, ManipulationTask, TaskConfig};
use render::HeadlessSurface;
use scene::Scene;
use sim::KinematicSim;
use std::path::{Path, PathBuf};

pub type TabletopEnv = GoalEnv<ManipulationTask<KinematicSim>>;

/// Goal-conditioned gripper benchmarks
#[derive(Debug, Parser)]
#[command(name = "gripbench")]
#[command(about = "Run goal-conditioned tabletop gripper tasks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play episodes with a baseline policy
    Run(RunArgs),

    /// Print the resolved configuration and observation space as JSON
    Describe(TaskArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TaskKind {
    Reach,
    Push,
    PickAndPlace,
}

impl TaskKind {
    #[must_use]
    pub fn preset(self) -> TaskConfig {
        match self {
            Self::Reach => TaskConfig::reach(),
            Self::Push => TaskConfig::push(),
            Self::PickAndPlace => TaskConfig::pick_and_place(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    Random,
    Scripted,
}

#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Task preset
    #[arg(long, value_enum, default_value_t = TaskKind::Reach)]
    pub task: TaskKind,

    /// JSON task configuration replacing the preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON scene replacing the built-in tabletop
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Randomize textures, camera and light on every reset
    #[arg(long)]
    pub domain_randomization: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub task: TaskArgs,

    #[arg(long, default_value_t = 10)]
    pub episodes: usize,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = PolicyKind::Scripted)]
    pub policy: PolicyKind,

    /// Directory receiving the last frame of every episode as PNG
    #[arg(long)]
    pub capture: Option<PathBuf>,

    #[arg(long, default_value_t = 320)]
    pub width: u32,

    #[arg(long, default_value_t = 240)]
    pub height: u32,
}

/// Outcome of one played episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeReport {
    pub episode: usize,
    pub steps: usize,
    pub episode_return: f32,
    pub success: bool,
    pub frame: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub episodes: Vec<EpisodeReport>,
}

impl RunSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f32 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        let solved = self.episodes.iter().filter(|e| e.success).count();
        solved as f32 / self.episodes.len() as f32
    }
}

/// Entry point called from `main`.
///
/// # Errors
///
/// Returns any error raised while loading inputs, stepping the environment or
/// writing captures.
pub fn run(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::init();

    match cli.command {
        Command::Run(args) => {
            let summary = play(&args)?;
            println!(
                "success rate: {:.2} over {} episodes",
                summary.success_rate(),
                summary.episodes.len()
            );
            Ok(())
        }
        Command::Describe(args) => {
            println!("{}", describe(&args)?);
            Ok(())
        }
    }
}

/// Resolve the task configuration from the preset or a JSON file.
///
/// # Errors
///
/// Fails if the configuration file cannot be read or is invalid.
pub fn resolve_config(args: &TaskArgs) -> Result<TaskConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read task config {}", path.display()))?;
            TaskConfig::from_json(&json)
                .with_context(|| format!("invalid task config {}", path.display()))?
        }
        None => args.task.preset(),
    };
    config.domain_randomization |= args.domain_randomization;
    Ok(config)
}

fn load_scene(path: Option<&Path>) -> Result<KinematicSim> {
    let scene = match path {
        Some(path) => Scene::from_path(path)?,
        None => Scene::tabletop()?,
    };
    scene.into_sim()
}

/// Build an environment, attaching an offscreen surface of `size` if given.
///
/// # Errors
///
/// Fails if the scene or configuration cannot be loaded or the task cannot be
/// initialized on the scene.
pub fn build_env(args: &TaskArgs, seed: u64, size: Option<(u32, u32)>) -> Result<TabletopEnv> {
    assemble(resolve_config(args)?, args.scene.as_deref(), seed, size)
}

/// Build the environment `play` runs. A surface is attached when frames are
/// captured or the resolved configuration randomizes appearance.
///
/// # Errors
///
/// Same as [`build_env`].
pub fn run_env(args: &RunArgs) -> Result<TabletopEnv> {
    let config = resolve_config(&args.task)?;
    let render = args.capture.is_some() || config.domain_randomization;
    let size = render.then_some((args.width, args.height));
    assemble(config, args.task.scene.as_deref(), args.seed, size)
}

fn assemble(config: TaskConfig, scene: Option<&Path>, seed: u64, size: Option<(u32, u32)>) -> Result<TabletopEnv> {
    let sim = load_scene(scene)?;
    let surface = size
        .map(|(width, height)| HeadlessSurface::new(&sim, width, height))
        .transpose()?;
    let mut task = ManipulationTask::new(sim, config)?;
    if let Some(surface) = surface {
        task = task.with_surface(Box::new(surface))?;
    }
    Ok(GoalEnv::new(task, seed)?)
}

/// Play `args.episodes` episodes and log each outcome.
///
/// # Errors
///
/// Propagates environment failures and capture write errors.
pub fn play(args: &RunArgs) -> Result<RunSummary> {
    let mut env = run_env(args)?;

    if let Some(dir) = &args.capture {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create capture directory {}", dir.display()))?;
    }

    let mut policy: Box<dyn Policy> = match args.policy {
        PolicyKind::Random => Box::new(RandomPolicy::new(args.seed)),
        PolicyKind::Scripted => Box::new(ScriptedPolicy::new(env.task().config())),
    };
    tracing::info!(
        task = ?args.task.task,
        policy = ?args.policy,
        episodes = args.episodes,
        "starting run"
    );

    let mut episodes = Vec::with_capacity(args.episodes);
    for episode in 0..args.episodes {
        let mut report = play_episode(&mut env, policy.as_mut(), episode)?;
        if let Some(dir) = &args.capture {
            report.frame = capture(&mut env, dir, episode)?;
        }
        tracing::info!(
            episode,
            steps = report.steps,
            episode_return = report.episode_return,
            success = report.success,
            "episode finished"
        );
        episodes.push(report);
    }
    Ok(RunSummary { episodes })
}

fn play_episode(env: &mut TabletopEnv, policy: &mut dyn Policy, episode: usize) -> Result<EpisodeReport> {
    let mut observation = env.reset()?;
    policy.reset();
    let mut episode_return = 0.0;
    let mut steps = 0;
    loop {
        let result = env.step(&policy.act(&observation))?;
        episode_return += result.reward;
        steps += 1;
        if result.terminated || result.truncated {
            return Ok(EpisodeReport {
                episode,
                steps,
                episode_return,
                success: result.info.is_success > 0.5,
                frame: None,
            });
        }
        observation = result.observation;
    }
}

fn capture(env: &mut TabletopEnv, dir: &Path, episode: usize) -> Result<Option<PathBuf>> {
    let Some(frame) = env.render()? else {
        tracing::warn!("no render surface attached, skipping capture");
        return Ok(None);
    };
    let path = dir.join(format!("episode_{episode:04}.png"));
    frame
        .save_png(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "frame saved");
    Ok(Some(path))
}

/// Configuration and observation space of the resolved task as pretty JSON.
///
/// # Errors
///
/// Fails if the environment cannot be built.
pub fn describe(args: &TaskArgs) -> Result<String> {
    let env = build_env(args, 0, None)?;
    let mut description = serde_json::Map::new();
    description.insert("config".to_owned(), serde_json::to_value(env.task().config())?);
    description.insert(
        "observation_space".to_owned(),
        serde_json::to_value(env.observation_space()?)?,
    );
    description.insert("action_size".to_owned(), env.action_size().into());
    Ok(serde_json::to_string_pretty(&description)?)
}
