//! Behaviour of the reference simulator: gravity and support, weld tracking,
//! finger servos, grasping, pushing and state snapshots.

mod common;

use approx::assert_relative_eq;
use common::{arm_with_cube, run, GRIP_BASE};
use sim::actuation::ctrl_set_action;
use sim::{KinematicSim, SimError, Simulator, Vec3};

fn fingers(sim: &mut KinematicSim, g: f32) {
    let mut action = vec![0.0; 7];
    action.extend([g, -g]);
    ctrl_set_action(sim, &action).unwrap();
}

#[test]
fn cube_falls_and_rests_on_support() {
    let mut sim = arm_with_cube(Vec3::new(0.5, 0.0, 0.2));
    run(&mut sim, 500);

    let qpos = sim.joint_qpos("cube:joint").unwrap();
    assert_relative_eq!(qpos[2], 0.02, epsilon = 1e-6);
    let qvel = sim.joint_qvel("cube:joint").unwrap();
    assert!(qvel.iter().all(|v| *v == 0.0));
    assert_relative_eq!(sim.site_xpos("cube").unwrap().z, 0.02, epsilon = 1e-6);
}

#[test]
fn weld_pulls_gripper_onto_mocap_target() {
    let mut sim = arm_with_cube(Vec3::new(0.5, 0.0, 0.02));
    let target = Vec3::new(0.1, -0.05, 0.25);
    sim.set_mocap_pos("mocap", target).unwrap();
    run(&mut sim, 300);

    let grip = sim.site_xpos("grip").unwrap();
    assert!(grip.distance(target) < 1e-3, "grip at {grip:?}");
    assert!(sim.site_xvelp("grip").unwrap().length() < 0.1);
}

#[test]
fn weld_speed_is_limited() {
    let mut sim = arm_with_cube(Vec3::new(0.5, 0.0, 0.02));
    sim.set_mocap_pos("mocap", GRIP_BASE + Vec3::new(0.5, 0.0, 0.0)).unwrap();
    sim.step();
    assert!(sim.site_xvelp("grip").unwrap().length() <= 2.0 + 1e-4);
}

#[test]
fn relative_finger_commands_saturate_at_joint_limits() {
    let mut sim = arm_with_cube(Vec3::new(0.5, 0.0, 0.02));
    fingers(&mut sim, 1.0);
    run(&mut sim, 200);

    assert_relative_eq!(sim.joint_qpos("robot:l_finger").unwrap()[0], 0.04);
    assert_relative_eq!(sim.joint_qpos("robot:r_finger").unwrap()[0], -0.04);
}

#[test]
fn closing_fingers_on_cube_grasps_and_lifts_it() {
    let mut sim = arm_with_cube(Vec3::new(0.0, 0.0, 0.02));
    fingers(&mut sim, 1.0);
    run(&mut sim, 100);

    sim.set_mocap_pos("mocap", Vec3::new(0.0, 0.0, 0.02)).unwrap();
    run(&mut sim, 300);
    // Open fingers straddle the cube instead of shoving it away.
    let cube = sim.site_xpos("cube").unwrap();
    assert_relative_eq!(cube.x, 0.0, epsilon = 1e-6);

    fingers(&mut sim, -1.0);
    run(&mut sim, 100);
    assert_eq!(sim.grasped(), Some("cube"));

    sim.set_mocap_pos("mocap", Vec3::new(0.0, 0.0, 0.2)).unwrap();
    run(&mut sim, 300);
    assert_relative_eq!(sim.site_xpos("cube").unwrap().z, 0.2, epsilon = 2e-3);

    fingers(&mut sim, 1.0);
    run(&mut sim, 400);
    assert_eq!(sim.grasped(), None);
    assert_relative_eq!(sim.site_xpos("cube").unwrap().z, 0.02, epsilon = 1e-6);
}

#[test]
fn closed_gripper_pushes_cube_ahead() {
    let mut sim = arm_with_cube(Vec3::new(0.1, 0.0, 0.02));
    sim.set_mocap_pos("mocap", Vec3::new(0.0, 0.0, 0.02)).unwrap();
    run(&mut sim, 300);
    assert_relative_eq!(sim.site_xpos("cube").unwrap().x, 0.1, epsilon = 1e-6);

    sim.set_mocap_pos("mocap", Vec3::new(0.2, 0.0, 0.02)).unwrap();
    run(&mut sim, 300);
    let cube = sim.site_xpos("cube").unwrap();
    assert!(cube.x > 0.2, "cube left behind at {cube:?}");
    assert_relative_eq!(cube.y, 0.0, epsilon = 1e-6);
    assert_eq!(sim.grasped(), None);
}

#[test]
fn unknown_names_and_bad_shapes_are_reported() {
    let mut sim = arm_with_cube(Vec3::new(0.5, 0.0, 0.02));
    assert_eq!(
        sim.joint_qpos("nope"),
        Err(SimError::UnknownJoint("nope".to_owned()))
    );
    assert!(matches!(sim.site_xpos("nope"), Err(SimError::UnknownSite(_))));
    assert!(matches!(sim.mocap_pos("nope"), Err(SimError::UnknownMocap(_))));
    assert!(matches!(sim.body_xpos("nope"), Err(SimError::UnknownBody(_))));
    assert_eq!(sim.set_ctrl(9, 0.0), Err(SimError::UnknownActuator(9)));
    assert_eq!(
        sim.set_joint_qpos("cube:joint", &[0.0; 3]),
        Err(SimError::ShapeMismatch {
            name: "cube:joint".to_owned(),
            expected: 7,
            got: 3,
        })
    );
}

#[test]
fn duplicate_names_are_rejected_by_builder() {
    let mut sim = arm_with_cube(Vec3::new(0.5, 0.0, 0.02));
    assert!(matches!(
        sim.add_site("grip", "gripper", Vec3::ZERO),
        Err(SimError::InvalidModel(_))
    ));
    assert!(matches!(
        sim.add_weld("mocap", "cube", Vec3::ZERO),
        Err(SimError::InvalidModel(_))
    ));
}

#[test]
fn state_snapshot_restores_everything() {
    let mut sim = arm_with_cube(Vec3::new(0.5, 0.0, 0.2));
    let initial = sim.get_state();
    let grip = sim.site_xpos("grip").unwrap();

    sim.set_mocap_pos("mocap", Vec3::new(0.2, 0.2, 0.2)).unwrap();
    run(&mut sim, 200);
    assert!(sim.site_xpos("grip").unwrap().distance(grip) > 0.1);

    sim.set_state(&initial).unwrap();
    sim.forward();
    assert_eq!(sim.site_xpos("grip").unwrap(), grip);
    assert_eq!(sim.get_state(), initial);
}

#[test]
fn snapshot_from_another_model_is_rejected() {
    let mut sim = arm_with_cube(Vec3::new(0.5, 0.0, 0.2));
    let other = KinematicSim::new(0.002).get_state();
    assert!(matches!(sim.set_state(&other), Err(SimError::StateMismatch(_))));
}

#[test]
fn geoms_follow_their_bodies() {
    let mut sim = arm_with_cube(Vec3::new(0.3, 0.1, 0.02));
    sim.forward();
    let geoms = sim.geoms();
    assert_eq!(geoms.len(), 1);
    assert_eq!(geoms[0].name, "cube_geom");
    assert_eq!(geoms[0].pos, Vec3::new(0.3, 0.1, 0.02));
}
