//! Spawners: fixed-location cue tables that launch new effect trees

use crate::random::RandomSource;
use crate::system::ParticleSystem;
use crate::templates::{EffectTemplate, TemplateBuilder};
use ember_core::{EmberError, Result, Vec3};
use log::info;
use serde::{Deserialize, Serialize};

/// Launch `template` when the spawner's counter reads `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub tick: u32,
    pub template: EffectTemplate,
}

impl Cue {
    pub fn new(tick: u32, template: EffectTemplate) -> Self {
        Self { tick, template }
    }
}

/// Replays a sorted cue table every `cycle` ticks.
///
/// The counter runs `0, 1, .., cycle - 1` and wraps. On each tick every cue
/// whose tick equals the counter fires, in table order, and each firing
/// builds a fresh, independently owned tree.
#[derive(Debug, Clone)]
pub struct Spawner {
    name: String,
    location: Vec3,
    cycle: u32,
    cues: Vec<Cue>,
    counter: u32,
}

impl Spawner {
    pub fn new(name: impl Into<String>, location: Vec3, cycle: u32, mut cues: Vec<Cue>) -> Result<Self> {
        let name = name.into();
        if cycle == 0 {
            return Err(EmberError::ConfigError(format!(
                "spawner '{name}' has a zero-length cycle"
            )));
        }
        if let Some(cue) = cues.iter().find(|cue| cue.tick >= cycle) {
            return Err(EmberError::ValueOutOfRange {
                field: format!("spawner '{name}' cue tick"),
                min: 0.0,
                max: (cycle - 1) as f64,
                value: cue.tick as f64,
            });
        }
        cues.sort_by_key(|cue| cue.tick);
        Ok(Self {
            name,
            location,
            cycle,
            cues,
            counter: 0,
        })
    }

    /// Fire `template` once every `period` ticks, starting on tick `period`
    pub fn periodic(
        name: impl Into<String>,
        location: Vec3,
        period: u32,
        template: EffectTemplate,
    ) -> Result<Self> {
        let cues = vec![Cue::new(period.saturating_sub(1), template)];
        Self::new(name, location, period, cues)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// The tick the next call to [`tick`](Self::tick) will evaluate
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Cues that fire on the next tick
    pub fn due(&self) -> &[Cue] {
        let start = self.cues.partition_point(|cue| cue.tick < self.counter);
        let end = self.cues.partition_point(|cue| cue.tick <= self.counter);
        &self.cues[start..end]
    }

    /// Advance one tick, building the trees for every cue that fires
    pub fn tick(&mut self, builder: &TemplateBuilder, rng: &mut dyn RandomSource) -> Vec<ParticleSystem> {
        let mut launched = Vec::new();
        for cue in self.due() {
            info!("spawner '{}' cued {} at tick {}", self.name, cue.template, self.counter);
            launched.extend(builder.build(cue.template, self.location, rng));
        }
        self.counter = (self.counter + 1) % self.cycle;
        launched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ParticleRng;
    use crate::system::EffectKind;

    fn fire_ticks(spawner: &mut Spawner, ticks: u32) -> Vec<(u32, usize)> {
        let builder = TemplateBuilder::default();
        let mut rng = ParticleRng::new(1);
        let mut fired = Vec::new();
        for t in 0..ticks {
            let systems = spawner.tick(&builder, &mut rng);
            if !systems.is_empty() {
                fired.push((t, systems.len()));
            }
        }
        fired
    }

    #[test]
    fn periodic_fires_every_period() {
        let mut spawner = Spawner::periodic("p", Vec3::ZERO, 4, EffectTemplate::Explosion).unwrap();
        let fired = fire_ticks(&mut spawner, 12);
        assert_eq!(fired, vec![(3, 1), (7, 1), (11, 1)]);
    }

    #[test]
    fn period_one_fires_every_tick() {
        let mut spawner = Spawner::periodic("p", Vec3::ZERO, 1, EffectTemplate::BasicRocket).unwrap();
        assert_eq!(fire_ticks(&mut spawner, 3).len(), 3);
    }

    #[test]
    fn cue_table_replays_cyclically() {
        let cues = vec![
            Cue::new(7, EffectTemplate::SprinklerRocket),
            Cue::new(2, EffectTemplate::ThickRocket),
        ];
        let mut spawner = Spawner::new("t", Vec3::ZERO, 10, cues).unwrap();
        assert_eq!(spawner.cues()[0].tick, 2);

        let fired = fire_ticks(&mut spawner, 25);
        assert_eq!(fired, vec![(2, 1), (7, 10), (12, 1), (17, 10), (22, 1)]);
        assert_eq!(spawner.counter(), 5);
    }

    #[test]
    fn shared_tick_fires_all_in_order() {
        let cues = vec![
            Cue::new(0, EffectTemplate::Explosion),
            Cue::new(0, EffectTemplate::BasicRocket),
        ];
        let mut spawner = Spawner::new("s", Vec3::new(5.0, 0.0, 0.0), 3, cues).unwrap();
        assert_eq!(spawner.due().len(), 2);

        let systems = spawner.tick(&TemplateBuilder::default(), &mut ParticleRng::new(2));
        let kinds: Vec<_> = systems.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec![EffectKind::Explosion, EffectKind::Rocket]);
        assert!(systems.iter().all(|s| s.origin() == Vec3::new(5.0, 0.0, 0.0)));
        assert!(systems.iter().all(|s| !s.is_initialized()));
        assert!(spawner.due().is_empty());
    }

    #[test]
    fn invalid_tables_rejected() {
        assert!(matches!(
            Spawner::new("z", Vec3::ZERO, 0, Vec::new()),
            Err(EmberError::ConfigError(_))
        ));
        assert!(matches!(
            Spawner::periodic("z", Vec3::ZERO, 0, EffectTemplate::Explosion),
            Err(EmberError::ConfigError(_))
        ));
        assert!(matches!(
            Spawner::new("z", Vec3::ZERO, 5, vec![Cue::new(5, EffectTemplate::Fountain)]),
            Err(EmberError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn empty_table_never_fires() {
        let mut spawner = Spawner::new("quiet", Vec3::ZERO, 3, Vec::new()).unwrap();
        assert!(fire_ticks(&mut spawner, 10).is_empty());
        assert_eq!(spawner.counter(), 1);
    }
}
