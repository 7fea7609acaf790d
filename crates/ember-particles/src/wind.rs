//! Ambient wind: one horizontal scalar per frame

use crate::random::RandomSource;
use ember_core::{EmberError, Result};

/// Supplies the frame's wind, sampled once before the registry update
pub trait WindSource {
    fn sample(&mut self, rng: &mut dyn RandomSource) -> f32;
}

/// Constant wind
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalmWind {
    pub speed: f32,
}

impl CalmWind {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }
}

impl WindSource for CalmWind {
    fn sample(&mut self, _rng: &mut dyn RandomSource) -> f32 {
        self.speed
    }
}

/// Steps through a precomputed table of gust samples.
///
/// Samples are in `[0, 1]` (typically coherent noise) and are mapped onto
/// `[-strength, strength]`. Each frame the cursor moves on with a chance of
/// `change_percent` in a hundred, so the wind holds for a while and then
/// shifts. The cursor wraps back to the first sample after the last.
#[derive(Debug, Clone)]
pub struct GustTable {
    samples: Vec<f32>,
    cursor: usize,
    strength: f32,
    change_percent: u32,
}

impl GustTable {
    pub fn new(samples: Vec<f32>, strength: f32, change_percent: u32) -> Result<Self> {
        if change_percent > 100 {
            return Err(EmberError::ValueOutOfRange {
                field: "wind.change_percent".into(),
                min: 0.0,
                max: 100.0,
                value: change_percent as f64,
            });
        }
        if samples.is_empty() {
            return Err(EmberError::ConfigError("gust table has no samples".into()));
        }
        let samples = samples.into_iter().map(|s| s.clamp(0.0, 1.0)).collect();
        Ok(Self {
            samples,
            cursor: 0,
            strength,
            change_percent,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Wind at the current cursor, without advancing
    pub fn current(&self) -> f32 {
        (self.samples[self.cursor] * 2.0 - 1.0) * self.strength
    }
}

impl WindSource for GustTable {
    fn sample(&mut self, rng: &mut dyn RandomSource) -> f32 {
        if rng.range(1, 100) <= self.change_percent {
            self.cursor = (self.cursor + 1) % self.samples.len();
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ParticleRng, SequenceRng};

    #[test]
    fn calm_wind_is_constant() {
        let mut wind = CalmWind::new(0.25);
        let mut rng = ParticleRng::new(1);
        for _ in 0..10 {
            assert_eq!(wind.sample(&mut rng), 0.25);
        }
    }

    #[test]
    fn gusts_map_samples_to_strength() {
        let mut table = GustTable::new(vec![0.0, 0.5, 1.0, 3.0], 2.0, 100).unwrap();
        let mut rng = SequenceRng::low();
        assert_eq!(table.sample(&mut rng), 0.0);
        assert_eq!(table.sample(&mut rng), 2.0);
        // Out-of-range samples were clamped to 1.0
        assert_eq!(table.sample(&mut rng), 2.0);
        assert_eq!(table.sample(&mut rng), -2.0);
        assert_eq!(table.cursor(), 0);
    }

    #[test]
    fn gusts_hold_when_no_change_drawn() {
        let mut table = GustTable::new(vec![0.25, 0.75], 1.0, 6).unwrap();
        // A draw of 100 never passes a 6% check
        let mut rng = SequenceRng::high();
        for _ in 0..20 {
            assert_eq!(table.sample(&mut rng), -0.5);
        }
        assert_eq!(table.cursor(), 0);
    }

    #[test]
    fn gusts_change_at_roughly_the_given_rate() {
        let mut table = GustTable::new((0..1000).map(|i| i as f32 / 1000.0).collect(), 1.0, 10).unwrap();
        let mut rng = ParticleRng::new(9);
        for _ in 0..2000 {
            table.sample(&mut rng);
        }
        assert!((120..=280).contains(&table.cursor()), "cursor {}", table.cursor());
    }

    #[test]
    fn gust_table_validation() {
        assert!(matches!(
            GustTable::new(vec![0.5], 1.0, 101),
            Err(EmberError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            GustTable::new(Vec::new(), 1.0, 5),
            Err(EmberError::ConfigError(_))
        ));
    }
}
