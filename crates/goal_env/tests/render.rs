mod common;

use approx::assert_relative_eq;
use common::{rendered_env, tabletop_env, tabletop_sim};
use goal_env::{GoalEnv, ManipulationTask, TaskConfig};
use render::{Frame, HeadlessSurface, RenderError, RenderSurface};
use sim::{Simulator, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Log {
    randomized: Vec<String>,
    camera: Vec<(String, Vec3)>,
    shadows: Vec<(String, bool)>,
    lights: Vec<(String, Vec3)>,
    fixed: Vec<usize>,
    views: Vec<(Vec3, f32, f32, f32)>,
}

/// Records every call and renders through a real headless surface.
struct Recording {
    inner: HeadlessSurface,
    log: Rc<RefCell<Log>>,
}

impl RenderSurface for Recording {
    fn surface_names(&self) -> Vec<String> {
        self.inner.surface_names()
    }

    fn randomize_surface(&mut self, name: &str, rng: &mut fastrand::Rng) -> Result<(), RenderError> {
        self.log.borrow_mut().randomized.push(name.to_owned());
        self.inner.randomize_surface(name, rng)
    }

    fn set_camera_pos(&mut self, name: &str, pos: Vec3) -> Result<(), RenderError> {
        self.log.borrow_mut().camera.push((name.to_owned(), pos));
        self.inner.set_camera_pos(name, pos)
    }

    fn set_light_castshadow(&mut self, name: &str, castshadow: bool) -> Result<(), RenderError> {
        self.log.borrow_mut().shadows.push((name.to_owned(), castshadow));
        self.inner.set_light_castshadow(name, castshadow)
    }

    fn set_light_pos(&mut self, name: &str, pos: Vec3) -> Result<(), RenderError> {
        self.log.borrow_mut().lights.push((name.to_owned(), pos));
        self.inner.set_light_pos(name, pos)
    }

    fn use_fixed_camera(&mut self, index: usize) -> Result<(), RenderError> {
        self.log.borrow_mut().fixed.push(index);
        self.inner.use_fixed_camera(index)
    }

    fn use_free_camera(&mut self) {
        self.inner.use_free_camera();
    }

    fn setup_view(&mut self, lookat: Vec3, distance: f32, azimuth: f32, elevation: f32) {
        self.log.borrow_mut().views.push((lookat, distance, azimuth, elevation));
        self.inner.setup_view(lookat, distance, azimuth, elevation);
    }

    fn read_pixels(&self, sim: &dyn Simulator) -> Result<Frame, RenderError> {
        self.inner.read_pixels(sim)
    }
}

fn recorded_env(config: TaskConfig, seed: u64) -> (GoalEnv<ManipulationTask<sim::KinematicSim>>, Rc<RefCell<Log>>) {
    let sim = tabletop_sim();
    let log = Rc::new(RefCell::new(Log::default()));
    let surface = Recording {
        inner: HeadlessSurface::new(&sim, 32, 24).unwrap(),
        log: Rc::clone(&log),
    };
    let task = ManipulationTask::new(sim, config)
        .unwrap()
        .with_surface(Box::new(surface))
        .unwrap();
    (GoalEnv::new(task, seed).unwrap(), log)
}

#[test]
fn no_surface_no_frame() {
    let mut env = tabletop_env(TaskConfig::reach(), 0);
    env.reset().unwrap();
    assert!(env.render().unwrap().is_none());
}

#[test]
fn render_moves_the_marker_to_the_goal() {
    let mut env = rendered_env(TaskConfig::pick_and_place(), 1);
    env.reset().unwrap();
    let frame = env.render().unwrap().unwrap();
    assert_eq!((frame.width(), frame.height()), (64, 48));

    let marker = env.task().sim().site_xpos("target0").unwrap();
    let goal = env.goal();
    assert_relative_eq!(marker.x, goal.x, epsilon = 1e-5);
    assert_relative_eq!(marker.y, goal.y, epsilon = 1e-5);
    assert_relative_eq!(marker.z, goal.z, epsilon = 1e-5);
}

#[test]
fn attaching_a_surface_aims_the_viewer_at_the_gripper() {
    let (env, log) = recorded_env(TaskConfig::reach(), 2);
    let gripper = env.task().sim().body_xpos("arm:gripper_link").unwrap();
    let log = log.borrow();
    let views = &log.views;
    assert_eq!(views.len(), 1);
    let (lookat, distance, azimuth, elevation) = views[0];
    assert!(lookat.distance(gripper) < 1e-4);
    assert_eq!((distance, azimuth, elevation), (2.2, 145.0, -25.0));
}

#[test]
fn capture_selects_fixed_camera_zero() {
    let (mut env, log) = recorded_env(TaskConfig::push(), 3);
    env.task_mut().surface_mut().unwrap().use_free_camera();
    assert!(env.render().unwrap().is_some());
    assert_eq!(log.borrow().fixed, vec![0]);
}

#[test]
fn plain_resets_leave_appearance_alone() {
    let (mut env, log) = recorded_env(TaskConfig::push(), 4);
    env.reset().unwrap();
    let log = log.borrow();
    assert!(log.randomized.is_empty() && log.camera.is_empty() && log.lights.is_empty());
}

#[test]
fn domain_randomization_jitters_surfaces_camera_and_light() {
    let mut config = TaskConfig::push();
    config.domain_randomization = true;
    let (mut env, log) = recorded_env(config, 5);
    let first = {
        env.reset().unwrap();
        env.render().unwrap().unwrap()
    };

    {
        let log = log.borrow();
        let names = env.task().surface().unwrap().surface_names();
        assert_eq!(log.randomized, names);

        let (camera, pos) = &log.camera[0];
        assert_eq!(camera, "camera0");
        assert!(pos.x.abs() <= 0.1 && (pos.y + 1.0).abs() <= 0.1 && (pos.z - 1.0).abs() <= 0.1);

        assert_eq!(log.shadows, vec![("light0".to_owned(), true)]);
        let (light, pos) = &log.lights[0];
        assert_eq!(light, "light0");
        assert!((pos.x - 0.8).abs() <= 0.85 && (pos.y - 0.9).abs() <= 0.85);
        assert_eq!(pos.z, 3.0);
    }

    env.reset().unwrap();
    let second = env.render().unwrap().unwrap();
    assert_ne!(first, second);
    assert_eq!(log.borrow().lights.len(), 2);
}
