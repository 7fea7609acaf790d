//! The set of live top-level systems, advanced once per frame

use crate::chain::ChainActivator;
use crate::random::RandomSource;
use crate::render::{ParticleDrawData, ParticleRenderer};
use crate::system::{FrameContext, ParticleSystem};
use ember_core::{EmberError, Result, SystemId};
use log::debug;
use serde::Serialize;

struct RegistryEntry {
    id: SystemId,
    system: ParticleSystem,
}

/// What happened to the registry during one update pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Chained systems admitted at the end of the pass
    pub activated: usize,
    /// Chained systems dropped because they failed to initialize
    pub rejected: usize,
    /// Finished systems removed
    pub reaped: usize,
}

/// Ordered collection of active top-level systems.
///
/// Owns every system it holds. Chain targets released during a pass are
/// buffered and appended after it, and finished systems are removed after it,
/// so the pass itself never sees the collection change.
pub struct Registry {
    entries: Vec<RegistryEntry>,
    next_id: SystemId,
    activator: ChainActivator,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: SystemId::from_raw(1),
            activator: ChainActivator::new(),
        }
    }

    /// Initialize `system` and admit it. On failure nothing is admitted.
    pub fn spawn(&mut self, mut system: ParticleSystem, rng: &mut dyn RandomSource) -> Result<SystemId> {
        system.initialize(rng)?;
        Ok(self.admit(system))
    }

    /// Take ownership of an already-initialized system.
    ///
    /// An uninitialized system would never update nor finish, so it is
    /// refused; use [`spawn`](Self::spawn) for those.
    pub fn adopt(&mut self, system: ParticleSystem) -> Result<SystemId> {
        if !system.is_initialized() {
            return Err(EmberError::NotInitialized(format!(
                "{} at {:?}",
                system.kind(),
                system.origin()
            )));
        }
        Ok(self.admit(system))
    }

    fn admit(&mut self, system: ParticleSystem) -> SystemId {
        let id = self.next_id;
        self.next_id = id.next();
        debug!("admitted {} {id} at {:?}", system.kind(), system.origin());
        self.entries.push(RegistryEntry { id, system });
        id
    }

    /// Advance every system one frame, then reap finished systems and admit
    /// whatever their chains released.
    pub fn update(&mut self, frame: &mut FrameContext<'_>) -> UpdateReport {
        for entry in &mut self.entries {
            entry.system.update(frame, &mut self.activator);
        }

        let before = self.entries.len();
        self.entries.retain(|entry| {
            if entry.system.is_finished() {
                debug!("reaped {} {}", entry.system.kind(), entry.id);
                false
            } else {
                true
            }
        });
        let reaped = before - self.entries.len();

        let activated = self.activator.drain();
        let report = UpdateReport {
            activated: activated.len(),
            rejected: self.activator.take_rejected(),
            reaped,
        };
        for system in activated {
            self.admit(system);
        }
        report
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: SystemId) -> Option<&ParticleSystem> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.system)
    }

    /// Systems in update order
    pub fn iter(&self) -> impl Iterator<Item = (SystemId, &ParticleSystem)> {
        self.entries.iter().map(|entry| (entry.id, &entry.system))
    }

    pub fn ids(&self) -> Vec<SystemId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Total live particles across all systems
    pub fn total_alive(&self) -> usize {
        self.entries.iter().map(|entry| entry.system.alive_count()).sum()
    }

    /// Draw data for each system that has live particles
    pub fn draw_data(&self) -> Vec<ParticleDrawData<'_>> {
        self.entries
            .iter()
            .filter(|entry| entry.system.alive_count() > 0)
            .map(|entry| ParticleDrawData {
                id: entry.id,
                kind: entry.system.kind(),
                render: entry.system.render_data(),
            })
            .collect()
    }

    /// Hand every non-empty system to `renderer`, in update order
    pub fn render(&self, renderer: &mut dyn ParticleRenderer) {
        for draw in self.draw_data() {
            renderer.draw(&draw);
        }
    }

    /// Drop every system
    pub fn clear(&mut self) {
        self.entries.clear();
        self.activator.drain();
        self.activator.take_rejected();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explosion::Explosion;
    use crate::fountain::Fountain;
    use crate::random::{ParticleRng, SequenceRng};
    use crate::render::DrawTally;
    use crate::rocket::Rocket;
    use crate::schedule::BatchSchedule;
    use crate::system::{EffectKind, SystemParams};
    use ember_core::{EmberError, Vec3};

    fn burst(capacity: usize, max_lifetime: u32) -> ParticleSystem {
        let params = SystemParams {
            max_lifetime,
            time_increment: 0.9,
            ..SystemParams::with_capacity(capacity)
        };
        ParticleSystem::new(params, Explosion::new(3.0))
    }

    fn fountain() -> ParticleSystem {
        let params = SystemParams {
            max_lifetime: 10,
            ..SystemParams::with_capacity(20)
        };
        ParticleSystem::new(params, Fountain::new(1.0, 70.0))
    }

    fn rocket(fuse: u32) -> ParticleSystem {
        let params = SystemParams {
            max_lifetime: 3,
            origin: Vec3::new(10.0, -200.0, 0.0),
            ..SystemParams::with_capacity(30)
        };
        ParticleSystem::new(
            params,
            Rocket::new(fuse, Vec3::new(0.0, 6.0, 0.0), 1.0).with_schedule(BatchSchedule::every_frame(2)),
        )
    }

    fn tick(registry: &mut Registry, rng: &mut dyn RandomSource) -> UpdateReport {
        let mut frame = FrameContext::new(0.0, rng);
        registry.update(&mut frame)
    }

    #[test]
    fn spawn_assigns_increasing_ids() {
        let mut registry = Registry::new();
        let mut rng = ParticleRng::new(1);
        let a = registry.spawn(fountain(), &mut rng).unwrap();
        let b = registry.spawn(burst(5, 5), &mut rng).unwrap();
        assert!(b > a);
        assert_eq!(registry.ids(), vec![a, b]);
        assert_eq!(registry.get(b).unwrap().kind(), EffectKind::Explosion);
    }

    #[test]
    fn failed_spawn_is_not_admitted() {
        let mut registry = Registry::new();
        let mut rng = ParticleRng::new(2);
        let err = registry.spawn(burst(usize::MAX / 2, 5), &mut rng).unwrap_err();
        assert!(matches!(err, EmberError::AllocationError { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn finished_system_removed_survivors_keep_order() {
        let mut registry = Registry::new();
        // Every lifetime draw is the minimum, so B's burst is gone after two frames
        let mut rng = SequenceRng::low();
        let a = registry.spawn(fountain(), &mut rng).unwrap();
        let b = registry.spawn(burst(4, 50), &mut rng).unwrap();
        let c = registry.spawn(fountain(), &mut rng).unwrap();

        let first = tick(&mut registry, &mut rng);
        assert_eq!(first.reaped, 0);
        assert_eq!(registry.len(), 3);

        let second = tick(&mut registry, &mut rng);
        assert_eq!(second.reaped, 1);
        assert_eq!(registry.ids(), vec![a, c]);
        assert!(registry.get(b).is_none());
    }

    #[test]
    fn finishing_system_hands_chain_to_registry() {
        let mut registry = Registry::new();
        let mut rng = SequenceRng::low();
        let a = registry.spawn(fountain(), &mut rng).unwrap();
        let b = registry
            .spawn(burst(4, 50).with_chain_target(burst(6, 50)), &mut rng)
            .unwrap();
        let c = registry.spawn(fountain(), &mut rng).unwrap();

        tick(&mut registry, &mut rng);
        let report = tick(&mut registry, &mut rng);
        assert_eq!(report.reaped, 1);
        assert_eq!(report.activated, 1);

        let ids = registry.ids();
        assert_eq!(ids.len(), 3);
        assert_eq!(&ids[..2], &[a, c]);
        assert!(ids[2] > c && ids[2] != b);
        assert_eq!(registry.get(ids[2]).unwrap().alive_count(), 6);
    }

    #[test]
    fn rocket_fan_out_lands_in_registry_at_detonation_point() {
        let mut registry = Registry::new();
        let mut rng = ParticleRng::new(3);
        let mut parent = rocket(4);
        for _ in 0..10 {
            parent.push_chain_target(burst(8, 20));
        }
        registry.spawn(parent, &mut rng).unwrap();

        let mut reports = Vec::new();
        for _ in 0..4 {
            reports.push(tick(&mut registry, &mut rng));
        }
        assert_eq!(reports.iter().map(|r| r.activated).sum::<usize>(), 10);
        assert_eq!(reports[3].activated, 10);
        assert_eq!(registry.len(), 11);

        let detonation = Vec3::new(10.0, -176.0, 0.0);
        let (_, parent) = registry.iter().next().unwrap();
        assert_eq!(parent.origin(), detonation);
        for (_, child) in registry.iter().skip(1) {
            assert_eq!(child.kind(), EffectKind::Explosion);
            assert_eq!(child.origin(), detonation);
        }
    }

    #[test]
    fn chained_rocket_tree_runs_to_empty() {
        let mut registry = Registry::new();
        let mut rng = ParticleRng::new(4);
        let mut root = rocket(3);
        for _ in 0..3 {
            root.push_chain_target(rocket(2).with_chain_target(burst(5, 4)));
        }
        registry.spawn(root, &mut rng).unwrap();

        let mut activated = 0;
        for _ in 0..60 {
            activated += tick(&mut registry, &mut rng).activated;
            for (_, system) in registry.iter() {
                assert!(system.alive_count() <= system.capacity());
            }
        }
        assert_eq!(activated, 6);
        assert!(registry.is_empty());
    }

    #[test]
    fn newly_activated_systems_wait_a_frame() {
        let mut registry = Registry::new();
        let mut rng = ParticleRng::new(5);
        registry
            .spawn(rocket(1).with_chain_target(rocket(5)), &mut rng)
            .unwrap();
        tick(&mut registry, &mut rng);
        let (_, child) = registry.iter().nth(1).unwrap();
        assert_eq!(child.effect().as_rocket().unwrap().countdown(), Some(5));
        assert_eq!(child.alive_count(), 0);
    }

    #[test]
    fn draw_data_skips_empty_systems() {
        let mut registry = Registry::new();
        let mut rng = ParticleRng::new(6);
        registry.spawn(fountain(), &mut rng).unwrap();
        registry.spawn(burst(7, 10), &mut rng).unwrap();

        // The fountain has not emitted yet
        let draws = registry.draw_data();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].render.count(), 7);

        tick(&mut registry, &mut rng);
        let mut tally = DrawTally::default();
        registry.render(&mut tally);
        assert_eq!(tally.draw_calls, 2);
        assert_eq!(tally.points, registry.total_alive());
    }

    #[test]
    fn adopt_refuses_uninitialized_system() {
        let mut registry = Registry::new();
        let err = registry.adopt(fountain()).unwrap_err();
        assert!(matches!(err, EmberError::NotInitialized(_)));
        assert!(registry.is_empty());

        let mut rng = ParticleRng::new(21);
        let mut system = fountain();
        system.initialize(&mut rng).unwrap();
        let id = registry.adopt(system).unwrap();
        assert_eq!(registry.len(), 1);

        tick(&mut registry, &mut rng);
        assert!(registry.get(id).unwrap().alive_count() > 0);
    }
}
