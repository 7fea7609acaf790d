//! One-shot spherical burst

use crate::particle::{Particle, ParticlePool};
use crate::random::{self, RandomSource};
use crate::system::SystemParams;
use ember_core::Vec3;

/// Every slot is filled in a single burst when the system is initialized.
/// Particles fly out in random directions, their velocity is multiplied by
/// the system's `time_increment` each frame, and they fall by a constant
/// `gravity` and drift with the wind. Lifetimes are drawn per particle from `[1, max_lifetime]`, so
/// the burst fades out unevenly. The system is finished once every particle
/// has expired.
#[derive(Debug, Clone)]
pub struct Explosion {
    /// Added to y every frame
    pub gravity: f32,
    pub launch_speed: f32,
    /// Per-particle launch speed variation, in percent
    pub speed_jitter: u32,
    /// Particles are killed once they fall this far below the origin
    pub floor_depth: Option<f32>,
}

impl Explosion {
    pub fn new(launch_speed: f32) -> Self {
        Self {
            gravity: 0.0,
            launch_speed,
            speed_jitter: 0,
            floor_depth: None,
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_speed_jitter(mut self, percent: u32) -> Self {
        self.speed_jitter = percent;
        self
    }

    pub fn with_floor_depth(mut self, depth: f32) -> Self {
        self.floor_depth = Some(depth);
        self
    }

    pub(crate) fn emit_one(
        &self,
        origin: Vec3,
        params: &SystemParams,
        rng: &mut dyn RandomSource,
    ) -> Particle {
        let dir = random::sphere_direction(rng);
        let speed = self.launch_speed * random::jitter(rng, self.speed_jitter);
        let lifetime = rng.range(1, params.max_lifetime.max(1));
        Particle::launched(origin, dir * speed, lifetime)
    }

    /// Fill every free slot; returns how many particles were launched
    pub(crate) fn burst(
        &self,
        pool: &mut ParticlePool,
        origin: Vec3,
        params: &SystemParams,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let mut launched = 0;
        while !pool.is_full() {
            if pool.admit(self.emit_one(origin, params, rng)).is_none() {
                break;
            }
            launched += 1;
        }
        launched
    }

    pub(crate) fn integrate(&self, p: &Particle, params: &SystemParams, wind: f32) -> Particle {
        let step = p.velocity + Vec3::new(wind, self.gravity, 0.0);
        Particle {
            position: p.position + step,
            velocity: p.velocity * params.time_increment,
            age: p.age + 1.0,
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
    use crate::random::{ParticleRng, SequenceRng};

    #[test]
    fn burst_fills_pool() {
        let params = SystemParams {
            max_lifetime: 10,
            ..SystemParams::with_capacity(32)
        };
        let mut pool = ParticlePool::try_with_capacity(32).unwrap();
        let mut rng = ParticleRng::new(3);
        let launched = Explosion::new(5.0).burst(&mut pool, Vec3::ZERO, &params, &mut rng);
        assert_eq!(launched, 32);
        assert_eq!(pool.alive_count(), 32);
        for p in pool.slots() {
            assert!((1..=10).contains(&p.lifetime));
        }
    }

    #[test]
    fn lifetime_never_zero() {
        let params = SystemParams {
            max_lifetime: 0,
            ..SystemParams::with_capacity(1)
        };
        let p = Explosion::new(1.0).emit_one(Vec3::ZERO, &params, &mut SequenceRng::low());
        assert_eq!(p.lifetime, 1);
    }

    #[test]
    fn velocity_decays_geometrically() {
        let explosion = Explosion::new(1.0).with_gravity(-1.0);
        let params = SystemParams {
            time_increment: 0.5,
            ..SystemParams::with_capacity(1)
        };
        let mut p = Particle::launched(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 5);

        p = explosion.integrate(&p, &params, 0.0);
        assert_eq!(p.position, Vec3::new(4.0, -1.0, 0.0));
        assert_eq!(p.velocity, Vec3::new(2.0, 0.0, 0.0));

        p = explosion.integrate(&p, &params, 0.25);
        assert_eq!(p.position, Vec3::new(6.25, -2.0, 0.0));
        assert_eq!(p.velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn time_increment_sets_decay_rate() {
        let explosion = Explosion::new(1.0);
        let v0 = Vec3::new(0.0, -4.0, 0.0);
        let p = Particle::launched(Vec3::ZERO, v0, 5);
        let decayed = |time_increment: f32| {
            let params = SystemParams {
                time_increment,
                ..SystemParams::with_capacity(1)
            };
            explosion.integrate(&p, &params, 0.0).velocity
        };
        assert_eq!(decayed(0.5), Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(decayed(0.25), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(decayed(1.0), v0);
    }

    #[test]
    fn floor_is_measured_from_origin() {
        let explosion = Explosion::new(1.0).with_floor_depth(2.0);
        let origin = Vec3::new(0.0, 10.0, 0.0);
        let mut p = Particle::launched(Vec3::new(0.0, 8.0, 0.0), Vec3::ZERO, 3);
        assert!(explosion.survives(&p, origin));
        p.position.y = 7.9;
        assert!(!explosion.survives(&p, origin));
        assert!(Explosion::new(1.0).survives(&p, origin));
    }

    #[test]
    fn launch_speed_jitter_in_bounds() {
        let explosion = Explosion::new(5.0).with_speed_jitter(5);
        let params = SystemParams::with_capacity(1);
        let mut rng = ParticleRng::new(11);
        for _ in 0..200 {
            let p = explosion.emit_one(Vec3::ZERO, &params, &mut rng);
            let speed = p.velocity.length();
            assert!(speed >= 5.0 * 0.95 - 0.01 && speed <= 5.0 * 1.05 + 0.01);
        }
    }
}
