//! Particle state, the fixed-slot pool, and the point vertices handed to the renderer

use bytemuck::{Pod, Zeroable};
use ember_core::{EmberError, Result, Vec3};

/// One point mass. A slot whose `lifetime` is zero is dead and free for reuse.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Remaining frames of life; 0 is the dead sentinel
    pub lifetime: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Accumulated simulation time, advanced by the system's time increment
    pub age: f32,
    /// Admitted during the current update; starts ageing on the next one
    pub newborn: bool,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            lifetime: 0,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            age: 0.0,
            newborn: false,
        }
    }

    /// A freshly launched particle at `position`
    pub fn launched(position: Vec3, velocity: Vec3, lifetime: u32) -> Self {
        Self {
            lifetime,
            position,
            velocity,
            age: 0.0,
            newborn: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lifetime > 0
    }
}

/// Output-buffer element, laid out as a `float3` point-sprite vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
}

impl From<Vec3> for PointVertex {
    fn from(v: Vec3) -> Self {
        Self {
            position: v.to_array(),
        }
    }
}

/// Fixed-capacity particle arena.
///
/// Slots are allocated once and reused in place; a particle is "destroyed" by
/// resetting its lifetime to zero. New particles always take the first dead
/// slot in pool order, so slot reuse is deterministic.
#[derive(Debug, Default)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    alive_count: usize,
}

impl ParticlePool {
    /// Reserve `capacity` dead slots, failing instead of aborting if the
    /// allocation cannot be made.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut particles = Vec::new();
        particles
            .try_reserve_exact(capacity)
            .map_err(|e| EmberError::allocation(capacity, e))?;
        particles.resize(capacity, Particle::dead());
        Ok(Self {
            particles,
            alive_count: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    pub fn is_full(&self) -> bool {
        self.alive_count >= self.particles.len()
    }

    /// Index of the first dead slot in pool order
    pub fn first_dead(&self) -> Option<usize> {
        self.particles.iter().position(|p| !p.is_alive())
    }

    /// Place `particle` into the first dead slot.
    /// Returns the slot index, or None (and drops the particle) if the pool is full.
    pub fn admit(&mut self, particle: Particle) -> Option<usize> {
        if !particle.is_alive() {
            return None;
        }
        let idx = self.first_dead()?;
        self.particles[idx] = particle;
        self.alive_count += 1;
        Some(idx)
    }

    /// Run one physics step over every live slot.
    ///
    /// `integrate` produces the particle's next physical state. Particles that
    /// were already alive before this update then lose one frame of lifetime;
    /// newborns skip that once. A particle whose lifetime reaches zero, or that
    /// `survives` rejects, is retired. Returns the number retired.
    pub fn step<F, K>(&mut self, mut integrate: F, mut survives: K) -> usize
    where
        F: FnMut(&Particle) -> Particle,
        K: FnMut(&Particle) -> bool,
    {
        let mut retired = 0;
        for slot in &mut self.particles {
            if !slot.is_alive() {
                continue;
            }

            let mut next = integrate(&*slot);
            next.lifetime = if slot.newborn {
                slot.lifetime
            } else {
                slot.lifetime - 1
            };
            next.newborn = false;
            *slot = next;

            if !slot.is_alive() || !survives(&*slot) {
                slot.lifetime = 0;
                retired += 1;
            }
        }
        self.alive_count -= retired;
        retired
    }

    /// Live particles in pool order
    pub fn iter_alive(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    /// Every slot, dead or alive, in pool order
    pub fn slots(&self) -> &[Particle] {
        &self.particles
    }
}
