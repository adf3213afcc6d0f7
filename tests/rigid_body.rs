//! Rigid body behavior: shape preservation, resting contact, friction.

use approx::assert_relative_eq;
use glam::DVec2;
use pbd2d::{
    Particle, Phase, SdfData, SimConfig, Simulation, SolverMode, PARTICLE_DIAM, PARTICLE_RAD,
};

/// A single row of `count` particles lying along x at height `y`.
fn row_body(sim: &mut Simulation, count: usize, y: f64, mass: f64) -> usize {
    let mut verts = Vec::new();
    let mut sdf = Vec::new();
    for k in 0..count {
        let x = (k as f64 - (count as f64 - 1.0) / 2.0) * PARTICLE_DIAM;
        verts.push(Particle::new(DVec2::new(x, y), mass, Phase::Solid));
        sdf.push(SdfData::new(DVec2::Y, PARTICLE_RAD));
    }
    sim.create_rigid_body(verts, sdf).unwrap()
}

fn pairwise_distances(sim: &Simulation, body: usize) -> Vec<f64> {
    let members = &sim.bodies[body].particles;
    let mut out = Vec::new();
    for (a, &i) in members.iter().enumerate() {
        for &j in &members[a + 1..] {
            out.push(sim.particles[i].p.distance(sim.particles[j].p));
        }
    }
    out
}

#[test]
fn dropped_body_comes_to_rest_on_the_floor() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.x_bounds = DVec2::new(-20.0, 20.0);
    sim.y_bounds = DVec2::new(0.0, 1_000_000.0);

    let body = row_body(&mut sim, 6, 5.0, 1.0);
    let rest_distances = pairwise_distances(&sim, body);

    for _ in 0..120 {
        sim.tick(1.0 / 60.0);
    }

    let com = sim.bodies[body].com();
    println!("resting com: {com:?}, kinetic energy {:.6}", sim.kinetic_energy());
    assert!(
        com.y >= PARTICLE_RAD - 1e-6 && com.y <= PARTICLE_RAD + 0.1,
        "body did not settle on the floor: com.y = {}",
        com.y
    );
    assert!(sim.kinetic_energy() < 0.1, "body still moving");

    for (before, after) in rest_distances.iter().zip(pairwise_distances(&sim, body)) {
        assert!(
            (after - before).abs() / before < 0.02,
            "member distance drifted: {before} -> {after}"
        );
    }
}

#[test]
fn free_body_preserves_its_shape_as_an_isometry() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.gravity = DVec2::ZERO;
    sim.x_bounds = DVec2::new(-100.0, 100.0);
    sim.y_bounds = DVec2::new(-100.0, 100.0);

    // A 2x2 square body with shearing initial velocities.
    let verts = vec![
        Particle::new(DVec2::new(0.0, 0.0), 1.0, Phase::Solid),
        Particle::new(DVec2::new(1.0, 0.0), 1.0, Phase::Solid),
        Particle::new(DVec2::new(1.0, 1.0), 1.0, Phase::Solid),
        Particle::new(DVec2::new(0.0, 1.0), 1.0, Phase::Solid),
    ];
    let sdf = vec![SdfData::new(DVec2::new(0.0, -1.0), PARTICLE_RAD); 4];
    let body = sim.create_rigid_body(verts, sdf).unwrap();

    sim.particles[0].v = DVec2::new(1.0, 0.5);
    sim.particles[2].v = DVec2::new(-1.0, -0.5);
    let rest_distances = pairwise_distances(&sim, body);

    for _ in 0..100 {
        sim.tick(1.0 / 60.0);
    }

    for (&before, after) in rest_distances.iter().zip(pairwise_distances(&sim, body)) {
        assert_relative_eq!(before, after, epsilon = 1e-6);
    }
}

#[test]
fn friction_brings_a_sliding_box_to_a_stop() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.x_bounds = DVec2::new(-20.0, 20.0);
    sim.y_bounds = DVec2::new(0.0, 1_000_000.0);

    // Resting exactly on the floor, drifting slowly sideways.
    let body = row_body(&mut sim, 4, PARTICLE_RAD, 1.0);
    for &i in &sim.bodies[body].particles.clone() {
        sim.particles[i].s_friction = 0.5;
        sim.particles[i].k_friction = 0.4;
        sim.particles[i].v = DVec2::new(0.1, 0.0);
    }
    let start_x = sim.bodies[body].com().x;

    for _ in 0..60 {
        sim.tick(1.0 / 60.0);
    }

    let travel = sim.bodies[body].com().x - start_x;
    let speed = sim.particles[sim.bodies[body].particles[0]].v.length();
    println!("travel {travel:.4}, residual speed {speed:.5}");
    assert!(speed < 1e-2, "box still sliding at {speed}");
    assert!(travel.abs() < 0.1, "box slid {travel}");

    // And it stays put under gravity alone.
    let x_before = sim.bodies[body].com().x;
    for _ in 0..60 {
        sim.tick(1.0 / 60.0);
    }
    assert!((sim.bodies[body].com().x - x_before).abs() < 1e-3);
}

#[test]
fn matrix_mode_settles_the_same_drop() {
    let mut config = SimConfig::default();
    config.mode = SolverMode::Matrix;
    let mut sim = Simulation::new(config);
    sim.x_bounds = DVec2::new(-20.0, 20.0);
    sim.y_bounds = DVec2::new(0.0, 1_000_000.0);

    let body = row_body(&mut sim, 6, 5.0, 1.0);
    for _ in 0..120 {
        sim.tick(1.0 / 60.0);
    }

    let com = sim.bodies[body].com();
    assert!(
        com.y >= PARTICLE_RAD - 1e-6 && com.y <= PARTICLE_RAD + 0.15,
        "matrix-mode body did not settle: com.y = {}",
        com.y
    );
    assert!(com.is_finite());
}

#[test]
fn stacked_bodies_do_not_sink_into_each_other() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.x_bounds = DVec2::new(-20.0, 20.0);
    sim.y_bounds = DVec2::new(0.0, 1_000_000.0);

    let bottom = row_body(&mut sim, 4, PARTICLE_RAD, 1.0);
    let top = row_body(&mut sim, 4, PARTICLE_RAD + PARTICLE_DIAM, 1.0);

    for _ in 0..240 {
        sim.tick(1.0 / 60.0);
    }

    let gap = sim.bodies[top].com().y - sim.bodies[bottom].com().y;
    println!("stack gap {gap:.4}");
    assert!(
        gap > PARTICLE_DIAM - 3.0 * pbd2d::EPSILON,
        "top body sank into the bottom one: gap = {gap}"
    );
}
