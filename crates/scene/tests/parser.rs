use approx::assert_relative_eq;
use scene::{Body, Scene};
use sim::{Simulator, Vec3};
use std::fs;

#[test]
fn parse_slider_example() {
    let json = fs::read_to_string("tests/data/slider.json").unwrap();
    let s = Scene::from_str(&json).unwrap();
    assert_eq!(s.bodies.len(), 3);
    assert_eq!(s.sites.len(), 1);
    assert!(matches!(s.bodies[2], Body::Free { half_size, .. } if half_size == 0.05));
    assert_eq!(s.gravity, [0.0, 0.0, -9.81]);
    assert!(s.grasp.is_none());
}

#[test]
fn sim_from_slider_drops_the_ball() {
    let mut sim = Scene::from_path("tests/data/slider.json")
        .unwrap()
        .into_sim()
        .unwrap();
    assert_relative_eq!(sim.site_xpos("tip").unwrap().z, 0.4);
    for _ in 0..200 {
        sim.step();
    }
    assert_relative_eq!(sim.body_xpos("ball").unwrap().z, 0.05);
}

#[test]
fn unknown_weld_body_is_reported() {
    let json = fs::read_to_string("tests/data/dangling_weld.json").unwrap();
    let err = Scene::from_str(&json).unwrap().into_sim().unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("hand"), "{msg}");
}

#[test]
fn missing_file_names_the_path() {
    let err = Scene::from_path("tests/data/nope.json").unwrap_err();
    assert!(format!("{err}").contains("nope.json"));
}

#[test]
fn non_positive_timestep_is_rejected() {
    let json = r#"{ "timestep": 0.0, "bodies": [] }"#;
    assert!(Scene::from_str(json).unwrap().into_sim().is_err());
}

#[test]
fn unknown_body_kind_fails_to_parse() {
    let json = r#"{ "bodies": [{ "kind": "hinge", "name": "x", "pos": [0, 0, 0] }] }"#;
    assert!(Scene::from_str(json).is_err());
}

#[test]
fn tabletop_settles_with_grip_over_the_table() {
    let sim = Scene::tabletop().unwrap().into_sim().unwrap();

    assert_eq!(sim.site_names()[0], "target0");
    assert_eq!(sim.mocap_names(), vec!["arm:mocap".to_owned()]);
    let grip = sim.site_xpos("arm:grip").unwrap();
    assert_relative_eq!(grip.x, 0.8, epsilon = 1e-6);
    assert_relative_eq!(grip.y, 0.685, epsilon = 1e-6);
    assert_relative_eq!(grip.z, 0.2975, epsilon = 1e-6);
    assert_eq!(sim.body_xpos("object0").unwrap(), Vec3::new(0.8, 0.685, 0.032));
}

#[test]
fn tabletop_finger_joints_are_last_arm_joints() {
    let sim = Scene::tabletop().unwrap().into_sim().unwrap();
    let arm: Vec<String> = sim
        .joint_names()
        .into_iter()
        .filter(|n| n.starts_with("arm:"))
        .collect();
    assert_eq!(arm.len(), 5);
    assert_eq!(arm[3], "arm:l_gripper_joint");
    assert_eq!(arm[4], "arm:r_gripper_joint");
    assert_eq!(sim.actuators().len(), 2);
    assert!(sim.actuators().iter().all(|a| a.relative));
}

#[test]
fn tabletop_exposes_render_fixtures() {
    let sim = Scene::tabletop().unwrap().into_sim().unwrap();
    assert_eq!(sim.cameras()[0].name, "camera0");
    assert_eq!(sim.lights()[0].name, "light0");
    assert_eq!(sim.geoms().len(), 4);
    let markers = sim.visible_sites();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].name, "target0");
}
