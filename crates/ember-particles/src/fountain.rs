//! Continuous projectile fountain

use crate::particle::Particle;
use crate::random::{self, RandomSource};
use crate::schedule::BatchSchedule;
use crate::system::SystemParams;
use ember_core::Vec3;

/// A fountain launches every particle at the same elevation and speed, around
/// a uniformly random azimuth, and places it in closed form:
/// `y(t) = origin.y + v_y·t + gravity·t²`, with x and z linear in t.
///
/// Fountains never finish on their own; they run until the caller stops
/// updating them.
#[derive(Debug, Clone)]
pub struct Fountain {
    /// Pre-scaled by the caller; the closed form uses `gravity·t²` directly
    pub gravity: f32,
    pub launch_speed: f32,
    /// Elevation above the horizontal, in degrees
    pub launch_angle: f32,
    /// Particles are killed once they drop this far below the origin
    pub floor_depth: Option<f32>,
    pub schedule: BatchSchedule,
}

impl Fountain {
    pub fn new(launch_speed: f32, launch_angle: f32) -> Self {
        Self {
            gravity: 0.0,
            launch_speed,
            launch_angle,
            floor_depth: None,
            schedule: BatchSchedule::every_frame(1),
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_floor_depth(mut self, depth: f32) -> Self {
        self.floor_depth = Some(depth);
        self
    }

    pub fn with_schedule(mut self, schedule: BatchSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub(crate) fn emit_one(
        &self,
        origin: Vec3,
        params: &SystemParams,
        rng: &mut dyn RandomSource,
    ) -> Particle {
        let azimuth = random::degrees(rng, 0, 359);
        let dir = random::direction(self.launch_angle.to_radians(), azimuth);
        Particle::launched(origin, dir * self.launch_speed, params.max_lifetime.max(1))
    }

    pub(crate) fn integrate(&self, p: &Particle, origin: Vec3, params: &SystemParams) -> Particle {
        let t = p.age;
        let position = Vec3::new(
            origin.x + p.velocity.x * t,
            origin.y + p.velocity.y * t + self.gravity * t * t,
            origin.z + p.velocity.z * t,
        );
        Particle {
            position,
            age: t + params.time_increment,
            ..p.clone()
        }
    }

    pub(crate) fn survives(&self, p: &Particle, origin: Vec3) -> bool {
        match self.floor_depth {
            Some(depth) => p.position.y >= origin.y - depth,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRng;

    fn params() -> SystemParams {
        SystemParams {
            max_lifetime: 5,
            time_increment: 1.0,
            ..SystemParams::with_capacity(10)
        }
    }

    #[test]
    fn launch_velocity_follows_angle() {
        let fountain = Fountain::new(2.0, 90.0);
        let p = fountain.emit_one(Vec3::ZERO, &params(), &mut SequenceRng::low());
        assert!(p.velocity.x.abs() < 1e-5);
        assert!((p.velocity.y - 2.0).abs() < 1e-5);
        assert_eq!(p.lifetime, 5);
        assert!(p.newborn);

        // Horizontal launch at azimuth 0 goes straight down +X
        let flat = Fountain::new(2.0, 0.0);
        let p = flat.emit_one(Vec3::ZERO, &params(), &mut SequenceRng::low());
        assert!((p.velocity.x - 2.0).abs() < 1e-5);
        assert!(p.velocity.y.abs() < 1e-5);
    }

    #[test]
    fn closed_form_trajectory() {
        let fountain = Fountain::new(1.0, 90.0).with_gravity(-0.5);
        let origin = Vec3::new(0.0, 10.0, 0.0);
        let mut p = fountain.emit_one(origin, &params(), &mut SequenceRng::low());

        // First step evaluates t = 0: the launch point
        p = fountain.integrate(&p, origin, &params());
        assert!((p.position.y - 10.0).abs() < 1e-5);

        // t = 1: 10 + 1 - 0.5
        p = fountain.integrate(&p, origin, &params());
        assert!((p.position.y - 10.5).abs() < 1e-5);

        // t = 2: 10 + 2 - 2
        p = fountain.integrate(&p, origin, &params());
        assert!((p.position.y - 10.0).abs() < 1e-5);
        assert!((p.age - 3.0).abs() < 1e-5);
    }

    #[test]
    fn floor_rule() {
        let fountain = Fountain::new(1.0, 45.0).with_floor_depth(0.0);
        let mut p = Particle::launched(Vec3::new(0.0, 0.5, 0.0), Vec3::ZERO, 3);
        assert!(fountain.survives(&p, Vec3::ZERO));
        p.position.y = -0.01;
        assert!(!fountain.survives(&p, Vec3::ZERO));
        assert!(Fountain::new(1.0, 45.0).survives(&p, Vec3::ZERO));

        // The floor follows the origin
        let raised = Vec3::new(0.0, 20.0, 0.0);
        p.position.y = 19.0;
        assert!(!fountain.survives(&p, raised));
        assert!(fountain.with_floor_depth(5.0).survives(&p, raised));
    }
}
