use sim::{KinematicSim, Simulator, Vec3, QUAT_IDENTITY};

pub const GRIP_BASE: Vec3 = Vec3::new(0.0, 0.0, 0.3);

/// Minimal arm: a welded cartesian gripper with two servo fingers and one cube.
pub fn arm_with_cube(cube_at: Vec3) -> KinematicSim {
    let mut sim = KinematicSim::new(0.002);
    sim.add_static_body("world", Vec3::ZERO, QUAT_IDENTITY).unwrap();
    sim.add_site("marker", "world", Vec3::ZERO).unwrap();
    sim.add_cartesian_body(
        "gripper",
        GRIP_BASE,
        ["robot:slide_x", "robot:slide_y", "robot:slide_z"],
        Some((-1.0, 1.0)),
    )
    .unwrap();
    sim.add_slide_joint("robot:l_finger", Some((0.0, 0.04))).unwrap();
    sim.add_slide_joint("robot:r_finger", Some((-0.04, 0.0))).unwrap();
    sim.add_site("grip", "gripper", Vec3::ZERO).unwrap();
    sim.add_mocap("mocap", GRIP_BASE, QUAT_IDENTITY).unwrap();
    sim.add_weld("mocap", "gripper", Vec3::ZERO).unwrap();
    sim.add_actuator("l_finger", "robot:l_finger", 40.0, true, (-1.0, 1.0)).unwrap();
    sim.add_actuator("r_finger", "robot:r_finger", 40.0, true, (-1.0, 1.0)).unwrap();
    sim.add_free_body("cube", "cube:joint", cube_at, QUAT_IDENTITY, 0.02).unwrap();
    sim.add_site("cube", "cube", Vec3::ZERO).unwrap();
    sim.add_geom("cube_geom", "cube", Vec3::ZERO, 0.02, [1.0, 0.0, 0.0, 1.0]).unwrap();
    sim.set_grasp("grip", ["robot:l_finger", "robot:r_finger"], 0.03, 0.03, 0.03)
        .unwrap();
    sim.forward();
    sim
}

pub fn run(sim: &mut KinematicSim, ticks: usize) {
    for _ in 0..ticks {
        sim.step();
    }
}
