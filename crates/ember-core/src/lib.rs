//! Ember Core - Foundational types for the Ember particle engine
//!
//! This crate provides the core types that all other Ember crates depend on:
//! - `SystemId` - Registry-assigned identifiers for live particle systems
//! - `Vec3` - Spatial vector type used for positions and velocities
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{EmberError, Result};
pub use id::SystemId;
pub use types::Vec3;
