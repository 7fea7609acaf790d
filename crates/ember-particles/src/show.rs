//! Show files: a whole display described in TOML

use crate::spawner::{Cue, Spawner};
use crate::templates::{ExplosionTuning, FountainTuning, RocketTuning, TemplateBuilder, TexturePalette};
use crate::wind::{CalmWind, GustTable, WindSource};
use ember_core::{EmberError, Result, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The built-in five-launcher display, as written by `ember init`
pub const BUILTIN_SHOW: &str = include_str!("builtin_show.toml");

/// Top-level show file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowConfig {
    /// Texture names; templates pick handles by index into this list
    #[serde(default = "default_textures")]
    pub textures: Vec<String>,
    #[serde(default)]
    pub show: ShowSettings,
    #[serde(default)]
    pub wind: WindConfig,
    #[serde(default)]
    pub rocket: RocketTuning,
    #[serde(default)]
    pub explosion: ExplosionTuning,
    #[serde(default)]
    pub fountain: FountainTuning,
    #[serde(default, rename = "spawner")]
    pub spawners: Vec<SpawnerConfig>,
}

fn default_textures() -> Vec<String> {
    ["green", "red", "blue", "yellow"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowSettings {
    /// Fixed seed for reproducible runs; unset means pick one at start
    pub seed: Option<u64>,
    /// Default run length for headless runs
    pub frames: u64,
    /// Upper bound on any single system's pool
    pub max_capacity: usize,
}

impl Default for ShowSettings {
    fn default() -> Self {
        Self {
            seed: None,
            frames: 4000,
            max_capacity: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindMode {
    Calm,
    #[default]
    Gusts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub mode: WindMode,
    /// Constant speed in calm mode
    pub speed: f32,
    /// Gusts range over `[-strength, strength]`
    pub strength: f32,
    /// Chance per frame, in percent, that the gust moves on
    pub change_percent: u32,
    /// Length of the gust table
    pub samples: usize,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            mode: WindMode::Gusts,
            speed: 0.0,
            strength: 1.0,
            change_percent: 6,
            samples: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub name: String,
    pub location: Vec3,
    #[serde(default = "default_cycle")]
    pub cycle: u32,
    #[serde(default)]
    pub cues: Vec<Cue>,
}

fn default_cycle() -> u32 {
    2000
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            textures: default_textures(),
            show: ShowSettings::default(),
            wind: WindConfig::default(),
            rocket: RocketTuning::default(),
            explosion: ExplosionTuning::default(),
            fountain: FountainTuning::default(),
            spawners: Vec::new(),
        }
    }
}

impl ShowConfig {
    /// The built-in display
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_SHOW)
    }

    /// Parse and validate a show document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ShowConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| match e {
            EmberError::TomlParseError(msg) => {
                EmberError::TomlParseError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the simulation cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.textures.is_empty() {
            return Err(EmberError::ConfigError("show lists no textures".into()));
        }
        if self.wind.change_percent > 100 {
            return Err(EmberError::ValueOutOfRange {
                field: "wind.change_percent".into(),
                min: 0.0,
                max: 100.0,
                value: self.wind.change_percent as f64,
            });
        }
        if self.wind.mode == WindMode::Gusts && self.wind.samples == 0 {
            return Err(EmberError::ConfigError(
                "gusting wind needs at least one sample".into(),
            ));
        }

        let max = self.show.max_capacity;
        for (field, capacity) in [
            ("rocket.capacity", self.rocket.capacity),
            ("explosion.capacity", self.explosion.capacity),
            ("fountain.capacity", self.fountain.capacity),
        ] {
            if capacity > max {
                return Err(EmberError::ValueOutOfRange {
                    field: field.into(),
                    min: 0.0,
                    max: max as f64,
                    value: capacity as f64,
                });
            }
        }

        self.build_spawners().map(|_| ())
    }

    pub fn template_builder(&self) -> TemplateBuilder {
        TemplateBuilder::new(
            self.rocket.clone(),
            self.explosion.clone(),
            self.fountain.clone(),
            TexturePalette::indexed(self.textures.len()),
        )
    }

    pub fn build_spawners(&self) -> Result<Vec<Spawner>> {
        self.spawners
            .iter()
            .map(|s| Spawner::new(s.name.clone(), s.location, s.cycle, s.cues.clone()))
            .collect()
    }

    /// Wind source for this show. Gusting wind reads `gust_samples`,
    /// which the caller generates (`wind.samples` of them, in `[0, 1]`).
    pub fn wind_source(&self, gust_samples: Vec<f32>) -> Result<Box<dyn WindSource>> {
        match self.wind.mode {
            WindMode::Calm => Ok(Box::new(CalmWind::new(self.wind.speed))),
            WindMode::Gusts => Ok(Box::new(GustTable::new(
                gust_samples,
                self.wind.strength,
                self.wind.change_percent,
            )?)),
        }
    }

    /// Total number of cues across all spawners
    pub fn cue_count(&self) -> usize {
        self.spawners.iter().map(|s| s.cues.len()).sum()
    }
}
