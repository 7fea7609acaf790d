//! Deferred activation of chained systems

use crate::random::RandomSource;
use crate::system::ParticleSystem;
use ember_core::Vec3;
use log::{debug, warn};

/// Collects systems released by a parent's trigger during a frame.
///
/// Each target inherits the parent's current origin and is initialized on
/// the spot; it only joins the registry when the registry drains the
/// activator after its update pass, so the pass in progress is never
/// disturbed. Targets that fail to initialize are dropped and counted.
#[derive(Debug, Default)]
pub struct ChainActivator {
    activated: Vec<ParticleSystem>,
    rejected: usize,
}

impl ChainActivator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `targets` to `origin`, initialize them, and hold them for admission
    pub fn activate(
        &mut self,
        origin: Vec3,
        targets: Vec<ParticleSystem>,
        rng: &mut dyn RandomSource,
    ) {
        for mut target in targets {
            target.set_origin(origin);
            match target.initialize(rng) {
                Ok(()) => {
                    debug!("activated chained {} at {:?}", target.kind(), origin);
                    self.activated.push(target);
                }
                Err(err) => {
                    warn!("chained {} not admitted: {err}", target.kind());
                    self.rejected += 1;
                }
            }
        }
    }

    /// Number of systems waiting for admission
    pub fn len(&self) -> usize {
        self.activated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activated.is_empty()
    }

    /// Number of targets dropped because they failed to initialize
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Hand over every activated system, in activation order
    pub fn drain(&mut self) -> Vec<ParticleSystem> {
        std::mem::take(&mut self.activated)
    }

    /// Read and reset the rejection count
    pub fn take_rejected(&mut self) -> usize {
        std::mem::take(&mut self.rejected)
    }
}
