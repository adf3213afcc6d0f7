//! Contact generation and resolution behavior.

use glam::DVec2;
use pbd2d::{Particle, Phase, SimConfig, Simulation, EPSILON, PARTICLE_DIAM};

fn solid(x: f64, y: f64, mass: f64) -> Particle {
    Particle::new(DVec2::new(x, y), mass, Phase::Solid)
}

fn no_gravity_sim() -> Simulation {
    let mut sim = Simulation::new(SimConfig::default());
    sim.gravity = DVec2::ZERO;
    sim.x_bounds = DVec2::new(-10.0, 10.0);
    sim.y_bounds = DVec2::new(-10.0, 10.0);
    sim
}

#[test]
fn head_on_pair_never_interpenetrates() {
    let mut sim = no_gravity_sim();
    let mut a = solid(-1.0, 0.0, 1.0);
    a.v = DVec2::new(1.0, 0.0);
    let mut b = solid(1.0, 0.0, 1.0);
    b.v = DVec2::new(-1.0, 0.0);
    sim.particles.push(a);
    sim.particles.push(b);

    for step in 0..30 {
        sim.tick(0.1);
        let dist = sim.particles[0].p.distance(sim.particles[1].p);
        assert!(
            dist >= PARTICLE_DIAM - EPSILON - 1e-6,
            "step {step}: pair overlaps, dist = {dist}"
        );
    }

    // Momentum was absorbed symmetrically: the pair is not still closing.
    let closing = (sim.particles[1].v - sim.particles[0].v).x;
    assert!(
        closing >= -1e-9,
        "pair still approaching at {closing} after settling"
    );
    println!(
        "final separation {:.4}",
        sim.particles[0].p.distance(sim.particles[1].p)
    );
}

#[test]
fn immovable_particles_are_bitwise_stable_across_ticks() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.x_bounds = DVec2::new(-10.0, 10.0);
    sim.y_bounds = DVec2::new(0.0, 100.0);

    let mut anchor = solid(0.0, 1.0, 0.0);
    anchor.v = DVec2::new(0.3, 0.0);
    sim.particles.push(anchor);
    // A particle dropped straight onto the anchor.
    sim.particles.push(solid(0.05, 2.2, 1.0));

    for _ in 0..120 {
        sim.tick(1.0 / 60.0);
    }

    assert_eq!(sim.particles[0].p, DVec2::new(0.0, 1.0));
    assert_eq!(sim.particles[0].v, DVec2::new(0.3, 0.0));
    // The dropped particle came to rest on top of the anchor, not inside it.
    let dist = sim.particles[0].p.distance(sim.particles[1].p);
    assert!(
        dist >= PARTICLE_DIAM - EPSILON - 1e-6,
        "resting distance {dist}"
    );
}

#[test]
fn particles_stay_inside_the_world_box() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.x_bounds = DVec2::new(-3.0, 3.0);
    sim.y_bounds = DVec2::new(0.0, 50.0);

    // A small pile dropped with sideways velocity so it slams the walls.
    for i in 0..5 {
        for j in 0..5 {
            let mut p = solid(-1.0 + 0.55 * f64::from(i), 2.0 + 0.55 * f64::from(j), 1.0);
            p.v = DVec2::new(if (i + j) % 2 == 0 { 6.0 } else { -6.0 }, 0.0);
            sim.particles.push(p);
        }
    }

    for _ in 0..180 {
        sim.tick(1.0 / 60.0);
    }

    for (k, p) in sim.particles.iter().enumerate() {
        assert!(
            p.p.x >= sim.x_bounds.x - 0.05 && p.p.x <= sim.x_bounds.y + 0.05,
            "particle {k} escaped horizontally: {:?}",
            p.p
        );
        assert!(
            p.p.y >= sim.y_bounds.x - 0.05,
            "particle {k} fell through the floor: {:?}",
            p.p
        );
        assert!(p.p.is_finite(), "particle {k} went non-finite");
    }
}

#[test]
fn solid_fluid_contact_keeps_the_phases_apart() {
    let mut sim = no_gravity_sim();
    sim.particles.push(solid(-0.3, 0.0, 1.0));
    sim.particles
        .push(Particle::new(DVec2::new(0.3, 0.0), 1.0, Phase::Fluid));

    sim.tick(1.0 / 60.0);

    let dist = sim.particles[0].p.distance(sim.particles[1].p);
    assert!(
        dist >= PARTICLE_DIAM - EPSILON - 1e-6,
        "solid-fluid pair still overlapping: {dist}"
    );
}

#[test]
fn mouse_kick_adds_speed_seven_radially() {
    let mut sim = no_gravity_sim();
    sim.particles.push(solid(2.0, 0.0, 1.0));
    sim.particles.push(solid(0.0, 3.0, 1.0));

    sim.mouse_pressed(DVec2::ZERO);

    assert!((sim.particles[0].v - DVec2::new(7.0, 0.0)).length() < 1e-9);
    assert!((sim.particles[1].v - DVec2::new(0.0, 7.0)).length() < 1e-9);
}
