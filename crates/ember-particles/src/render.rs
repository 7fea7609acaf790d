//! Hand-off to the external renderer

use crate::particle::PointVertex;
use crate::system::EffectKind;
use ember_core::SystemId;
use serde::{Deserialize, Serialize};

/// Opaque texture reference supplied by the asset side; never interpreted here
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureHandle(pub u32);

/// One system's live particles for this frame
#[derive(Clone, Copy, Debug)]
pub struct RenderData<'a> {
    /// Compacted positions of live particles, in pool order
    pub points: &'a [PointVertex],
    pub point_size: f32,
    pub texture: TextureHandle,
}

impl<'a> RenderData<'a> {
    pub fn count(&self) -> usize {
        self.points.len()
    }

    /// Raw vertex bytes, ready for a vertex-buffer upload
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.points)
    }
}

/// Draw data for one registered system, consumed by the renderer
#[derive(Clone, Copy, Debug)]
pub struct ParticleDrawData<'a> {
    pub id: SystemId,
    pub kind: EffectKind,
    pub render: RenderData<'a>,
}

/// Something that draws point sprites. Performs no physics.
pub trait ParticleRenderer {
    fn draw(&mut self, draw: &ParticleDrawData<'_>);
}

/// Renderer that only tallies what it was asked to draw
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawTally {
    pub draw_calls: usize,
    pub points: usize,
    pub bytes: usize,
}

impl ParticleRenderer for DrawTally {
    fn draw(&mut self, draw: &ParticleDrawData<'_>) {
        self.draw_calls += 1;
        self.points += draw.render.count();
        self.bytes += draw.render.as_bytes().len();
    }
}
