//! Random draws for launch angles, speeds and lifetimes
//!
//! Every draw the simulation makes goes through [`RandomSource`], a uniform
//! integer draw over an inclusive range. Angles and speed jitter are expressed
//! in whole degrees and whole percent, so a scripted source can pin every
//! particle down exactly in tests.

use ember_core::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform integer draws over inclusive ranges
pub trait RandomSource {
    /// Returns a value in `[low, high]`. If `high < low`, returns `low`.
    fn range(&mut self, low: u32, high: u32) -> u32;
}

/// Seedable generator backed by `rand`'s `StdRng`
pub struct ParticleRng {
    inner: StdRng,
}

impl ParticleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for ParticleRng {
    fn range(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.inner.random_range(low..=high)
    }
}

/// Uniform whole-degree angle in `[low, high]`, returned in radians
pub fn degrees(rng: &mut dyn RandomSource, low: u32, high: u32) -> f32 {
    (rng.range(low, high) as f32).to_radians()
}

/// Multiplier in `[1 - jitter%, 1 + jitter%]`, drawn in whole percent
pub fn jitter(rng: &mut dyn RandomSource, percent: u32) -> f32 {
    let percent = percent.min(100);
    rng.range(100 - percent, 100 + percent) as f32 / 100.0
}

/// Signed offset in `[-half_span, half_span]` at 1/100 resolution.
///
/// `half_span` is in hundredths, so `signed_hundredths(rng, 15)` lands in
/// `[-0.15, 0.15]`.
pub fn signed_hundredths(rng: &mut dyn RandomSource, half_span: u32) -> f32 {
    (rng.range(0, half_span * 2) as f32 - half_span as f32) / 100.0
}

/// Direction from an elevation above the XZ plane and an azimuth around +Y
pub fn direction(elevation: f32, azimuth: f32) -> Vec3 {
    Vec3::new(
        elevation.cos() * azimuth.cos(),
        elevation.sin(),
        elevation.cos() * azimuth.sin(),
    )
}

/// Random direction over the whole sphere (whole-degree resolution)
pub fn sphere_direction(rng: &mut dyn RandomSource) -> Vec3 {
    let azimuth = degrees(rng, 0, 359);
    let elevation = (rng.range(0, 180) as f32 - 90.0).to_radians();
    direction(elevation, azimuth)
}

/// Random direction inside a cone of `half_angle_deg` around `axis`
pub fn cone_direction(rng: &mut dyn RandomSource, axis: Vec3, half_angle_deg: u32) -> Vec3 {
    let axis = axis.normalized_or(Vec3::UP);
    if half_angle_deg == 0 {
        return axis;
    }
    let polar = degrees(rng, 0, half_angle_deg.min(180));
    let azimuth = degrees(rng, 0, 359);

    // Local direction in cone around +Z
    let local = Vec3::new(
        polar.sin() * azimuth.cos(),
        polar.sin() * azimuth.sin(),
        polar.cos(),
    );
    rotate_to_basis(axis, local)
}

/// Rotates `local` (assumed around +Z) to align with `forward`
fn rotate_to_basis(forward: Vec3, local: Vec3) -> Vec3 {
    let up = if forward.y.abs() > 0.99 {
        Vec3::RIGHT
    } else {
        Vec3::UP
    };
    let right = up.cross(&forward).normalized_or(Vec3::RIGHT);
    let actual_up = forward.cross(&right);

    right * local.x + actual_up * local.y + forward * local.z
}

/// Scripted source for tests: cycles through `values`, clamping each into the
/// requested range.
#[cfg(test)]
pub(crate) struct SequenceRng {
    values: Vec<u32>,
    cursor: usize,
}

#[cfg(test)]
impl SequenceRng {
    pub(crate) fn new(values: &[u32]) -> Self {
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }

    /// Always answers the low end of the requested range
    pub(crate) fn low() -> Self {
        Self::new(&[0])
    }

    /// Always answers the high end of the requested range
    pub(crate) fn high() -> Self {
        Self::new(&[u32::MAX])
    }
}

#[cfg(test)]
impl RandomSource for SequenceRng {
    fn range(&mut self, low: u32, high: u32) -> u32 {
        let v = self.values.get(self.cursor).copied().unwrap_or(0);
        self.cursor = (self.cursor + 1) % self.values.len().max(1);
        v.clamp(low, high.max(low))
    }
}
