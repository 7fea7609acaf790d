//! A particle system: one fixed pool driven by an emission/physics/termination policy

use crate::chain::ChainActivator;
use crate::explosion::Explosion;
use crate::fountain::Fountain;
use crate::particle::{Particle, ParticlePool, PointVertex};
use crate::random::RandomSource;
use crate::render::{RenderData, TextureHandle};
use crate::rocket::Rocket;
use ember_core::{EmberError, Result, Vec3};
use log::debug;
use std::fmt;

/// Tunables shared by every effect variant
#[derive(Debug, Clone, PartialEq)]
pub struct SystemParams {
    /// Number of particle slots
    pub capacity: usize,
    /// Lifetime (in frames) given to new particles; explosions draw up to it
    pub max_lifetime: u32,
    pub origin: Vec3,
    /// Point-sprite size hint for the renderer
    pub point_size: f32,
    /// Per-frame step: fountains and rockets add it to each particle's `age`,
    /// explosions multiply velocity by it
    pub time_increment: f32,
    pub texture: TextureHandle,
}

impl SystemParams {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            max_lifetime: 1,
            origin: Vec3::ZERO,
            point_size: 1.0,
            time_increment: 1.0,
            texture: TextureHandle::default(),
        }
    }
}

/// Per-frame inputs handed to every system's update
pub struct FrameContext<'a> {
    /// Horizontal wind, added to x by systems that respond to it
    pub wind: f32,
    pub rng: &'a mut dyn RandomSource,
}

impl<'a> FrameContext<'a> {
    pub fn new(wind: f32, rng: &'a mut dyn RandomSource) -> Self {
        Self { wind, rng }
    }
}

/// The effect variants
#[derive(Debug, Clone)]
pub enum Effect {
    Fountain(Fountain),
    Explosion(Explosion),
    Rocket(Rocket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Fountain,
    Explosion,
    Rocket,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EffectKind::Fountain => "fountain",
            EffectKind::Explosion => "explosion",
            EffectKind::Rocket => "rocket",
        };
        f.write_str(name)
    }
}

/// What a system's terminal check decided this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Transition {
    pub trigger_chain: bool,
    pub finished: bool,
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Fountain(_) => EffectKind::Fountain,
            Effect::Explosion(_) => EffectKind::Explosion,
            Effect::Rocket(_) => EffectKind::Rocket,
        }
    }

    pub fn as_rocket(&self) -> Option<&Rocket> {
        match self {
            Effect::Rocket(rocket) => Some(rocket),
            _ => None,
        }
    }

    fn emission_quota(&mut self) -> usize {
        match self {
            Effect::Fountain(fountain) => fountain.schedule.due(),
            Effect::Explosion(_) => 0,
            Effect::Rocket(rocket) => rocket.emission_quota(),
        }
    }

    fn emit_one(&self, origin: Vec3, params: &SystemParams, rng: &mut dyn RandomSource) -> Particle {
        match self {
            Effect::Fountain(fountain) => fountain.emit_one(origin, params, rng),
            Effect::Explosion(explosion) => explosion.emit_one(origin, params, rng),
            Effect::Rocket(rocket) => rocket.emit_one(origin, params, rng),
        }
    }

    fn integrate(&self, p: &Particle, origin: Vec3, params: &SystemParams, wind: f32) -> Particle {
        match self {
            Effect::Fountain(fountain) => fountain.integrate(p, origin, params),
            Effect::Explosion(explosion) => explosion.integrate(p, params, wind),
            Effect::Rocket(rocket) => rocket.integrate(p, params, wind),
        }
    }

    fn survives(&self, p: &Particle, origin: Vec3) -> bool {
        match self {
            Effect::Fountain(fountain) => fountain.survives(p, origin),
            Effect::Explosion(explosion) => explosion.survives(p, origin),
            Effect::Rocket(_) => true,
        }
    }

    fn advance(&mut self, origin: &mut Vec3, alive: usize, wind: f32) -> Transition {
        match self {
            Effect::Fountain(_) => Transition::default(),
            Effect::Explosion(_) => Transition {
                trigger_chain: alive == 0,
                finished: alive == 0,
            },
            Effect::Rocket(rocket) => rocket.advance(origin, alive, wind),
        }
    }
}

impl From<Fountain> for Effect {
    fn from(f: Fountain) -> Self {
        Effect::Fountain(f)
    }
}

impl From<Explosion> for Effect {
    fn from(e: Explosion) -> Self {
        Effect::Explosion(e)
    }
}

impl From<Rocket> for Effect {
    fn from(r: Rocket) -> Self {
        Effect::Rocket(r)
    }
}

/// A bounded pool of particles plus the policy that fills, moves and ends it.
///
/// Lifecycle: construct with parameters, [`initialize`](Self::initialize)
/// once, then [`update`](Self::update) once per frame until
/// [`is_finished`](Self::is_finished). Chain targets are owned until the
/// system's trigger fires, at which point they are handed to the
/// [`ChainActivator`] and the queue is left empty.
#[derive(Debug)]
pub struct ParticleSystem {
    params: SystemParams,
    effect: Effect,
    pool: ParticlePool,
    points: Vec<PointVertex>,
    chain_targets: Vec<ParticleSystem>,
    initialized: bool,
    finished: bool,
}

impl ParticleSystem {
    pub fn new(params: SystemParams, effect: impl Into<Effect>) -> Self {
        Self {
            params,
            effect: effect.into(),
            pool: ParticlePool::default(),
            points: Vec::new(),
            chain_targets: Vec::new(),
            initialized: false,
            finished: false,
        }
    }

    /// Queue `target` to be activated when this system triggers
    pub fn with_chain_target(mut self, target: ParticleSystem) -> Self {
        self.chain_targets.push(target);
        self
    }

    pub fn push_chain_target(&mut self, target: ParticleSystem) {
        self.chain_targets.push(target);
    }

    pub fn chain_targets(&self) -> &[ParticleSystem] {
        &self.chain_targets
    }

    pub fn kind(&self) -> EffectKind {
        self.effect.kind()
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    pub fn params(&self) -> &SystemParams {
        &self.params
    }

    pub fn origin(&self) -> Vec3 {
        self.params.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.params.origin = origin;
    }

    pub fn capacity(&self) -> usize {
        self.params.capacity
    }

    pub fn alive_count(&self) -> usize {
        self.pool.alive_count()
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Allocate the pool and output buffer.
    ///
    /// Explosions fire their whole burst here. A zero-capacity system has
    /// nothing to show: it is flagged finished at once and its chain targets
    /// are discarded. Calling this again on an initialized system is a no-op.
    pub fn initialize(&mut self, rng: &mut dyn RandomSource) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let capacity = self.params.capacity;
        let pool = ParticlePool::try_with_capacity(capacity)?;
        let mut points = Vec::new();
        points
            .try_reserve_exact(capacity)
            .map_err(|e| EmberError::allocation(capacity, e))?;

        self.pool = pool;
        self.points = points;
        self.initialized = true;

        if capacity == 0 {
            debug!(
                "{} has no particle slots; dropping {} chain target(s)",
                self.kind(),
                self.chain_targets.len()
            );
            self.chain_targets.clear();
            self.finished = true;
            return Ok(());
        }

        if let Effect::Explosion(explosion) = &self.effect {
            let launched = explosion.burst(&mut self.pool, self.params.origin, &self.params, rng);
            debug!("explosion burst of {launched} at {:?}", self.params.origin);
            self.refresh_points();
        }

        Ok(())
    }

    /// Advance one frame: emit, integrate, retire, compact the output buffer,
    /// then evaluate the terminal condition and fire the chain on its
    /// transition. Does nothing before initialization, after finishing, or for
    /// a zero-capacity system.
    pub fn update(&mut self, frame: &mut FrameContext<'_>, activator: &mut ChainActivator) {
        if !self.initialized || self.finished || self.params.capacity == 0 {
            return;
        }

        let origin = self.params.origin;

        // Emission, bounded by free slots
        let quota = self.effect.emission_quota();
        for _ in 0..quota {
            if self.pool.is_full() {
                break;
            }
            let particle = self.effect.emit_one(origin, &self.params, &mut *frame.rng);
            self.pool.admit(particle);
        }

        // Physics, lifetime, floor
        let effect = &self.effect;
        let params = &self.params;
        let wind = frame.wind;
        self.pool.step(
            |p| effect.integrate(p, origin, params, wind),
            |p| effect.survives(p, origin),
        );

        self.refresh_points();

        // Terminal condition
        let alive = self.pool.alive_count();
        let transition = self.effect.advance(&mut self.params.origin, alive, wind);
        if transition.trigger_chain {
            let targets = std::mem::take(&mut self.chain_targets);
            if !targets.is_empty() {
                debug!(
                    "{} triggered {} chained system(s) at {:?}",
                    self.kind(),
                    targets.len(),
                    self.params.origin
                );
                activator.activate(self.params.origin, targets, &mut *frame.rng);
            }
        }
        if transition.finished {
            self.finished = true;
        }
    }

    /// Read-only view of this frame's live positions for the renderer
    pub fn render_data(&self) -> RenderData<'_> {
        RenderData {
            points: &self.points,
            point_size: self.params.point_size,
            texture: self.params.texture,
        }
    }

    fn refresh_points(&mut self) {
        self.points.clear();
        self.points
            .extend(self.pool.iter_alive().map(|p| PointVertex::from(p.position)));
    }
}
