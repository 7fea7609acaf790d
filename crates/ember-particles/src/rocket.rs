//! Firework rocket: a moving emitter with a fuse

use crate::particle::Particle;
use crate::random::{self, RandomSource};
use crate::schedule::BatchSchedule;
use crate::system::{SystemParams, Transition};
use ember_core::Vec3;

/// Where a rocket is in its flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RocketPhase {
    /// Climbing and trailing sparks; `countdown` frames until detonation
    Ascending { countdown: u32 },
    /// Chain fired; the remaining trail is burning out
    Activated,
}

/// A rocket climbs by `ascent` (plus wind) every frame, leaving a trail of
/// short-lived sparks launched in a cone around its direction of travel.
/// When the fuse runs out its chain targets are activated at its current
/// position and the trail stops. The rocket is finished once the last spark
/// has expired.
#[derive(Debug, Clone)]
pub struct Rocket {
    /// Origin displacement per frame
    pub ascent: Vec3,
    pub launch_speed: f32,
    /// Half-angle of the spark cone, in degrees
    pub spread: u32,
    /// Per-spark launch speed variation, in percent
    pub speed_jitter: u32,
    /// Added to each spark's y every frame
    pub gravity: f32,
    pub schedule: BatchSchedule,
    phase: RocketPhase,
}

impl Rocket {
    pub fn new(fuse: u32, ascent: Vec3, launch_speed: f32) -> Self {
        Self {
            ascent,
            launch_speed,
            spread: 0,
            speed_jitter: 0,
            gravity: 0.0,
            schedule: BatchSchedule::every_frame(1),
            phase: RocketPhase::Ascending { countdown: fuse },
        }
    }

    pub fn with_spread(mut self, degrees: u32) -> Self {
        self.spread = degrees;
        self
    }

    pub fn with_speed_jitter(mut self, percent: u32) -> Self {
        self.speed_jitter = percent;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_schedule(mut self, schedule: BatchSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn phase(&self) -> RocketPhase {
        self.phase
    }

    /// Frames left before detonation, if still ascending
    pub fn countdown(&self) -> Option<u32> {
        match self.phase {
            RocketPhase::Ascending { countdown } => Some(countdown),
            RocketPhase::Activated => None,
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self.phase, RocketPhase::Ascending { .. })
    }

    pub(crate) fn emission_quota(&mut self) -> usize {
        if self.is_ascending() {
            self.schedule.due()
        } else {
            0
        }
    }

    pub(crate) fn emit_one(
        &self,
        origin: Vec3,
        params: &SystemParams,
        rng: &mut dyn RandomSource,
    ) -> Particle {
        let dir = random::cone_direction(rng, self.ascent, self.spread);
        let speed = self.launch_speed * random::jitter(rng, self.speed_jitter);
        Particle::launched(origin, dir * speed, params.max_lifetime.max(1))
    }

    pub(crate) fn integrate(&self, p: &Particle, params: &SystemParams, wind: f32) -> Particle {
        let step = p.velocity + Vec3::new(wind, self.gravity, 0.0);
        Particle {
            position: p.position + step,
            age: p.age + params.time_increment,
            ..p.clone()
        }
    }

    /// Move the emitter, burn the fuse, and report the frame's transition
    pub(crate) fn advance(&mut self, origin: &mut Vec3, alive: usize, wind: f32) -> Transition {
        *origin = (*origin + self.ascent).drifted(wind);

        let detonated = match self.phase {
            RocketPhase::Ascending { countdown } if countdown <= 1 => {
                self.phase = RocketPhase::Activated;
                true
            }
            RocketPhase::Ascending { countdown } => {
                self.phase = RocketPhase::Ascending {
                    countdown: countdown - 1,
                };
                false
            }
            RocketPhase::Activated => false,
        };

        Transition {
            trigger_chain: detonated,
            finished: !self.is_ascending() && alive == 0,
        }
    }
}
