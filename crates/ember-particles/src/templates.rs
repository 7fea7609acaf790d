//! Effect templates: named recipes that build whole system trees
//!
//! Every template starts from the base tunings below and varies a few knobs.
//! All random choices (fuse, drift, texture) are drawn at build time, so two
//! builds of the same template differ.

use crate::explosion::Explosion;
use crate::fountain::Fountain;
use crate::random::{self, RandomSource};
use crate::render::TextureHandle;
use crate::rocket::Rocket;
use crate::schedule::BatchSchedule;
use crate::system::{ParticleSystem, SystemParams};
use ember_core::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The recipes a spawner can cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTemplate {
    /// A rocket with a thin trail
    BasicRocket,
    /// A rocket with a long-lived, large-point trail
    ThickRocket,
    /// A rocket that bursts into an explosion
    RocketWithExplosion,
    /// Ten independent rockets fanning out from one spot
    SprinklerRocket,
    /// A rocket that releases ten rockets in random directions
    DoubleRocket,
    /// As `DoubleRocket`, each child ending in its own explosion
    DoubleRocketExplosion,
    Fountain,
    Explosion,
}

impl EffectTemplate {
    pub const ALL: [EffectTemplate; 8] = [
        EffectTemplate::BasicRocket,
        EffectTemplate::ThickRocket,
        EffectTemplate::RocketWithExplosion,
        EffectTemplate::SprinklerRocket,
        EffectTemplate::DoubleRocket,
        EffectTemplate::DoubleRocketExplosion,
        EffectTemplate::Fountain,
        EffectTemplate::Explosion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EffectTemplate::BasicRocket => "basic_rocket",
            EffectTemplate::ThickRocket => "thick_rocket",
            EffectTemplate::RocketWithExplosion => "rocket_with_explosion",
            EffectTemplate::SprinklerRocket => "sprinkler_rocket",
            EffectTemplate::DoubleRocket => "double_rocket",
            EffectTemplate::DoubleRocketExplosion => "double_rocket_explosion",
            EffectTemplate::Fountain => "fountain",
            EffectTemplate::Explosion => "explosion",
        }
    }
}

impl fmt::Display for EffectTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque texture handles a template may pick from.
///
/// Handles are indices into the show's texture list; the core never looks
/// inside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexturePalette {
    handles: Vec<TextureHandle>,
}

impl TexturePalette {
    pub fn new(handles: Vec<TextureHandle>) -> Self {
        Self { handles }
    }

    /// Handles `0..count`
    pub fn indexed(count: usize) -> Self {
        Self::new((0..count as u32).map(TextureHandle).collect())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Uniform pick; an empty palette yields the default handle
    pub fn pick(&self, rng: &mut dyn RandomSource) -> TextureHandle {
        if self.handles.is_empty() {
            return TextureHandle::default();
        }
        let last = self.handles.len() as u32 - 1;
        self.handles[rng.range(0, last) as usize]
    }
}

impl Default for TexturePalette {
    fn default() -> Self {
        Self::indexed(4)
    }
}

/// Base rocket tuning plus the knobs the rocket templates vary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketTuning {
    pub capacity: usize,
    /// Minimum fuse, in frames
    pub fuse: u32,
    /// The fuse is lengthened by a draw from `[0, fuse_jitter)`
    pub fuse_jitter: u32,
    pub batch_size: usize,
    pub batch_interval: u32,
    pub trail_lifetime: u32,
    pub trail_speed: f32,
    /// Half-angle of the trail cone, in degrees
    pub spread: u32,
    /// Trail launch speed variation, in percent
    pub speed_jitter: u32,
    pub gravity: f32,
    pub time_increment: f32,
    pub point_size: f32,
    /// Vertical climb per frame
    pub climb: f32,
    /// Sideways climb drift in x and z, drawn from `[-drift, drift]`
    pub drift: f32,
    /// Batch size for the thin-trailed rockets
    pub light_batch_size: usize,
    pub thick_lifetime: u32,
    pub thick_point_size: f32,
    pub sprinkler_count: usize,
    pub sprinkler_drift: f32,
    /// Children released by the double rockets
    pub child_count: usize,
    pub child_fuse: u32,
    /// Child climb is drawn from `[-child_drift, child_drift]` on every axis
    pub child_drift: f32,
}

impl Default for RocketTuning {
    fn default() -> Self {
        Self {
            capacity: 500,
            fuse: 40,
            fuse_jitter: 20,
            batch_size: 20,
            batch_interval: 1,
            trail_lifetime: 20,
            trail_speed: 1.0,
            spread: 25,
            speed_jitter: 10,
            gravity: 0.0,
            time_increment: 0.05,
            point_size: 0.5,
            climb: 6.0,
            drift: 0.15,
            light_batch_size: 5,
            thick_lifetime: 50,
            thick_point_size: 2.0,
            sprinkler_count: 10,
            sprinkler_drift: 1.8,
            child_count: 10,
            child_fuse: 40,
            child_drift: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionTuning {
    pub capacity: usize,
    /// Upper bound of the per-particle lifetime draw
    pub lifetime: u32,
    pub launch_speed: f32,
    pub speed_jitter: u32,
    pub gravity: f32,
    /// Velocity multiplier applied every frame
    pub time_increment: f32,
    pub point_size: f32,
}

impl Default for ExplosionTuning {
    fn default() -> Self {
        Self {
            capacity: 600,
            lifetime: 100,
            launch_speed: 5.0,
            speed_jitter: 5,
            gravity: -0.5,
            time_increment: 0.95,
            point_size: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FountainTuning {
    pub capacity: usize,
    pub lifetime: u32,
    pub launch_speed: f32,
    /// Elevation in degrees
    pub launch_angle: f32,
    pub gravity: f32,
    pub batch_size: usize,
    pub batch_interval: u32,
    pub time_increment: f32,
    pub point_size: f32,
    /// Particles die this far below the launch point; unset means never
    pub floor_depth: Option<f32>,
}

impl Default for FountainTuning {
    fn default() -> Self {
        Self {
            capacity: 400,
            lifetime: 120,
            launch_speed: 4.0,
            launch_angle: 75.0,
            gravity: -0.1,
            batch_size: 3,
            batch_interval: 0,
            time_increment: 0.5,
            point_size: 1.0,
            floor_depth: Some(0.0),
        }
    }
}

/// Rocket shape after the template has applied its variations
struct RocketRecipe {
    fuse: u32,
    ascent: Vec3,
    trail_lifetime: u32,
    point_size: f32,
    batch_size: usize,
}

/// Turns templates into ready-to-spawn, uninitialized system trees
#[derive(Debug, Clone, Default)]
pub struct TemplateBuilder {
    pub rocket: RocketTuning,
    pub explosion: ExplosionTuning,
    pub fountain: FountainTuning,
    pub palette: TexturePalette,
}

impl TemplateBuilder {
    pub fn new(
        rocket: RocketTuning,
        explosion: ExplosionTuning,
        fountain: FountainTuning,
        palette: TexturePalette,
    ) -> Self {
        Self {
            rocket,
            explosion,
            fountain,
            palette,
        }
    }

    /// Largest pool any template can request
    pub fn max_capacity(&self) -> usize {
        self.rocket
            .capacity
            .max(self.explosion.capacity)
            .max(self.fountain.capacity)
    }

    /// Build the top-level systems for `template` at `location`
    pub fn build(
        &self,
        template: EffectTemplate,
        location: Vec3,
        rng: &mut dyn RandomSource,
    ) -> Vec<ParticleSystem> {
        match template {
            EffectTemplate::BasicRocket => {
                let mut recipe = self.base_recipe(rng);
                recipe.batch_size = self.rocket.light_batch_size;
                vec![self.rocket_system(recipe, location, rng)]
            }
            EffectTemplate::ThickRocket => {
                let mut recipe = self.base_recipe(rng);
                recipe.trail_lifetime = self.rocket.thick_lifetime;
                recipe.point_size = self.rocket.thick_point_size;
                vec![self.rocket_system(recipe, location, rng)]
            }
            EffectTemplate::RocketWithExplosion => {
                let recipe = self.base_recipe(rng);
                let rocket = self
                    .rocket_system(recipe, location, rng)
                    .with_chain_target(self.explosion_system(location, rng));
                vec![rocket]
            }
            EffectTemplate::SprinklerRocket => (0..self.rocket.sprinkler_count)
                .map(|_| {
                    let mut recipe = self.base_recipe(rng);
                    let half = hundredths(self.rocket.sprinkler_drift);
                    recipe.ascent = Vec3::new(
                        random::signed_hundredths(rng, half),
                        self.rocket.climb,
                        random::signed_hundredths(rng, half),
                    );
                    recipe.trail_lifetime = self.rocket.thick_lifetime;
                    recipe.point_size = self.rocket.thick_point_size;
                    self.rocket_system(recipe, location, rng)
                })
                .collect(),
            EffectTemplate::DoubleRocket => vec![self.double_rocket(location, false, rng)],
            EffectTemplate::DoubleRocketExplosion => vec![self.double_rocket(location, true, rng)],
            EffectTemplate::Fountain => vec![self.fountain_system(location, rng)],
            EffectTemplate::Explosion => vec![self.explosion_system(location, rng)],
        }
    }

    /// A single base-tuned rocket
    pub fn rocket_system_at(&self, location: Vec3, rng: &mut dyn RandomSource) -> ParticleSystem {
        let recipe = self.base_recipe(rng);
        self.rocket_system(recipe, location, rng)
    }

    pub fn explosion_system(&self, location: Vec3, rng: &mut dyn RandomSource) -> ParticleSystem {
        let tuning = &self.explosion;
        let params = SystemParams {
            capacity: tuning.capacity,
            max_lifetime: tuning.lifetime,
            origin: location,
            point_size: tuning.point_size,
            time_increment: tuning.time_increment,
            texture: self.palette.pick(rng),
        };
        let explosion = Explosion::new(tuning.launch_speed)
            .with_gravity(tuning.gravity)
            .with_speed_jitter(tuning.speed_jitter);
        ParticleSystem::new(params, explosion)
    }

    pub fn fountain_system(&self, location: Vec3, rng: &mut dyn RandomSource) -> ParticleSystem {
        let tuning = &self.fountain;
        let params = SystemParams {
            capacity: tuning.capacity,
            max_lifetime: tuning.lifetime,
            origin: location,
            point_size: tuning.point_size,
            time_increment: tuning.time_increment,
            texture: self.palette.pick(rng),
        };
        let mut fountain = Fountain::new(tuning.launch_speed, tuning.launch_angle)
            .with_gravity(tuning.gravity)
            .with_schedule(BatchSchedule::new(tuning.batch_size, tuning.batch_interval));
        if let Some(depth) = tuning.floor_depth {
            fountain = fountain.with_floor_depth(depth);
        }
        ParticleSystem::new(params, fountain)
    }

    fn double_rocket(
        &self,
        location: Vec3,
        with_explosions: bool,
        rng: &mut dyn RandomSource,
    ) -> ParticleSystem {
        let recipe = self.base_recipe(rng);
        let mut parent = self.rocket_system(recipe, location, rng);
        let half = hundredths(self.rocket.child_drift);
        for _ in 0..self.rocket.child_count {
            let mut recipe = self.base_recipe(rng);
            recipe.fuse = self.rocket.child_fuse;
            recipe.ascent = Vec3::new(
                random::signed_hundredths(rng, half),
                random::signed_hundredths(rng, half),
                random::signed_hundredths(rng, half),
            );
            if with_explosions {
                recipe.batch_size = self.rocket.light_batch_size;
            }
            let mut child = self.rocket_system(recipe, location, rng);
            if with_explosions {
                child.push_chain_target(self.explosion_system(location, rng));
            }
            parent.push_chain_target(child);
        }
        parent
    }

    fn base_recipe(&self, rng: &mut dyn RandomSource) -> RocketRecipe {
        let tuning = &self.rocket;
        let fuse = tuning.fuse + rng.range(0, tuning.fuse_jitter.saturating_sub(1));
        let half = hundredths(tuning.drift);
        let ascent = Vec3::new(
            random::signed_hundredths(rng, half),
            tuning.climb,
            random::signed_hundredths(rng, half),
        );
        RocketRecipe {
            fuse,
            ascent,
            trail_lifetime: tuning.trail_lifetime,
            point_size: tuning.point_size,
            batch_size: tuning.batch_size,
        }
    }

    fn rocket_system(
        &self,
        recipe: RocketRecipe,
        location: Vec3,
        rng: &mut dyn RandomSource,
    ) -> ParticleSystem {
        let tuning = &self.rocket;
        let params = SystemParams {
            capacity: tuning.capacity,
            max_lifetime: recipe.trail_lifetime,
            origin: location,
            point_size: recipe.point_size,
            time_increment: tuning.time_increment,
            texture: self.palette.pick(rng),
        };
        let rocket = Rocket::new(recipe.fuse, recipe.ascent, tuning.trail_speed)
            .with_spread(tuning.spread)
            .with_speed_jitter(tuning.speed_jitter)
            .with_gravity(tuning.gravity)
            .with_schedule(BatchSchedule::new(recipe.batch_size, tuning.batch_interval));
        ParticleSystem::new(params, rocket)
    }
}

fn hundredths(span: f32) -> u32 {
    (span.abs() * 100.0).round() as u32
}
