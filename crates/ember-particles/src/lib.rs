//! Ember Particles - pooled particle effects and firework scheduling
//!
//! Provides frame-stepped simulation of bounded particle systems with:
//! - Fixed-capacity pools with first-dead-slot reuse
//! - Fountain, explosion and rocket emission policies
//! - Chained effects released exactly once on a parent's trigger
//! - A registry that advances, reaps and admits systems once per frame
//! - Spawners replaying cue tables of effect templates from a TOML show file

pub mod chain;
pub mod explosion;
pub mod fountain;
pub mod particle;
pub mod random;
pub mod registry;
pub mod render;
pub mod rocket;
pub mod schedule;
pub mod show;
pub mod spawner;
pub mod system;
pub mod templates;
pub mod wind;

use ember_core::{Result, SystemId, Vec3};
use log::warn;
use serde::Serialize;

pub use chain::ChainActivator;
pub use explosion::Explosion;
pub use fountain::Fountain;
pub use particle::{Particle, ParticlePool, PointVertex};
pub use random::{ParticleRng, RandomSource};
pub use registry::{Registry, UpdateReport};
pub use render::{DrawTally, ParticleDrawData, ParticleRenderer, RenderData, TextureHandle};
pub use rocket::{Rocket, RocketPhase};
pub use schedule::BatchSchedule;
pub use show::{ShowConfig, WindMode, BUILTIN_SHOW};
pub use spawner::{Cue, Spawner};
pub use system::{Effect, EffectKind, FrameContext, ParticleSystem, SystemParams};
pub use templates::{EffectTemplate, TemplateBuilder, TexturePalette};
pub use wind::{CalmWind, GustTable, WindSource};

/// Summary of one show frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    /// Frames completed, including this one
    pub frame: u64,
    pub wind: f32,
    /// Top-level systems admitted from spawner cues
    pub spawned: usize,
    /// Systems dropped because they failed to initialize
    pub rejected: usize,
    /// Chained systems admitted after the update pass
    pub activated: usize,
    pub reaped: usize,
    pub active_systems: usize,
    pub live_particles: usize,
}

/// A running display: spawners feeding a registry under one wind source.
///
/// Each [`tick`](Self::tick) samples the wind, lets every spawner launch its
/// due cues, then advances the registry one frame.
pub struct FireworkShow {
    registry: Registry,
    spawners: Vec<Spawner>,
    builder: TemplateBuilder,
    wind: Box<dyn WindSource>,
    rng: ParticleRng,
    frame: u64,
}

impl FireworkShow {
    pub fn new(
        spawners: Vec<Spawner>,
        builder: TemplateBuilder,
        wind: Box<dyn WindSource>,
        seed: u64,
    ) -> Self {
        Self {
            registry: Registry::new(),
            spawners,
            builder,
            wind,
            rng: ParticleRng::new(seed),
            frame: 0,
        }
    }

    pub fn from_config(config: &ShowConfig, wind: Box<dyn WindSource>, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.build_spawners()?,
            config.template_builder(),
            wind,
            seed,
        ))
    }

    /// Run one frame
    pub fn tick(&mut self) -> FrameStats {
        let wind = self.wind.sample(&mut self.rng);

        let mut spawned = 0;
        let mut rejected = 0;
        for spawner in &mut self.spawners {
            for system in spawner.tick(&self.builder, &mut self.rng) {
                match self.registry.spawn(system, &mut self.rng) {
                    Ok(_) => spawned += 1,
                    Err(err) => {
                        warn!("spawner '{}' launch not admitted: {err}", spawner.name());
                        rejected += 1;
                    }
                }
            }
        }

        let mut frame = FrameContext::new(wind, &mut self.rng);
        let report = self.registry.update(&mut frame);
        self.frame += 1;

        FrameStats {
            frame: self.frame,
            wind,
            spawned,
            rejected: rejected + report.rejected,
            activated: report.activated,
            reaped: report.reaped,
            active_systems: self.registry.len(),
            live_particles: self.registry.total_alive(),
        }
    }

    /// Launch `template` outside any spawner's schedule
    pub fn launch(&mut self, template: EffectTemplate, location: Vec3) -> Result<Vec<SystemId>> {
        let systems = self.builder.build(template, location, &mut self.rng);
        systems
            .into_iter()
            .map(|system| self.registry.spawn(system, &mut self.rng))
            .collect()
    }

    /// Hand every visible system to `renderer`
    pub fn render(&self, renderer: &mut dyn ParticleRenderer) {
        self.registry.render(renderer);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn spawners(&self) -> &[Spawner] {
        &self.spawners
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
