//! Flow-field particle visualization.
//!
//! A pool of particles drifts along a Perlin-noise flow field, scatters away
//! from a pressed pointer and fades out as it ages. Each tick draws onto a
//! persistent surface that is darkened slightly first, leaving trails.
//!
//! The core is backend-agnostic: the flow field comes in through
//! [`NoiseSource`] and drawing goes out through [`Renderer`].
//!
//! ```
//! use flow_field_particles::{Bounds, DrawCall, Params, PerlinField, PointerState, Simulation};
//!
//! let mut sim = Simulation::new(Params::default(), Bounds::new(800.0, 600.0));
//! let field = PerlinField::new(1);
//! let mut calls: Vec<DrawCall> = Vec::new();
//! sim.frame(&field, PointerState::default(), 1, &mut calls);
//! assert_eq!(sim.len(), 200);
//! ```

pub mod controls;
pub mod error;
pub mod field;
pub mod input;
pub mod params;
pub mod particle;
pub mod render;
pub mod simulation;

pub use controls::{Control, ControlChange};
pub use error::{AppError, ControlError};
pub use field::{NoiseSource, PerlinField};
pub use input::{InputQueue, PointerState};
pub use params::{Bounds, ColorMode, Params, Tuning};
pub use particle::Particle;
pub use render::{Canvas, DrawCall, Hsba, Renderer};
pub use simulation::Simulation;
