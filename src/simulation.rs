use cgmath::Vector2;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::controls::ControlChange;
use crate::field::NoiseSource;
use crate::input::{InputQueue, PointerState};
use crate::params::{Bounds, Params, Tuning};
use crate::particle::{Particle, UpdateContext};
use crate::render::Renderer;

/// The particle pool and the parameters that drive it.
///
/// Particles live in a flat slot array. An exhausted particle is reset in
/// place; the array only grows or shrinks on population changes and ripple
/// spawns.
pub struct Simulation<R = StdRng> {
    particles: Vec<Particle>,
    params: Params,
    tuning: Tuning,
    bounds: Bounds,
    time: u64,
    rng: R,
}

impl Simulation<StdRng> {
    pub fn new(params: Params, bounds: Bounds) -> Self {
        Self::with_rng(params, Tuning::default(), bounds, StdRng::from_entropy())
    }
}

impl<R: Rng> Simulation<R> {
    /// Builds the simulation with `params.particle_count` randomized particles.
    pub fn with_rng(params: Params, tuning: Tuning, bounds: Bounds, mut rng: R) -> Self {
        let particles = (0..params.particle_count)
            .map(|_| Particle::spawn(&mut rng, bounds, &tuning, params.particle_size))
            .collect();

        Self {
            particles,
            params,
            tuning,
            bounds,
            time: 0,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Frames simulated so far.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Live population ceiling while ripples are around.
    pub fn soft_cap(&self) -> usize {
        self.params.particle_count + self.tuning.ripple_headroom
    }

    /// Runs one tick: fade the surface, advance time, then update and draw
    /// every particle in collection order.
    pub fn frame<N, D>(&mut self, field: &N, pointer: PointerState, frame_count: u64, renderer: &mut D)
    where
        N: NoiseSource + ?Sized,
        D: Renderer + ?Sized,
    {
        renderer.fade(self.tuning.trail_alpha);
        self.time += 1;

        let ctx = UpdateContext {
            field,
            pointer,
            time: self.time,
            params: &self.params,
            tuning: &self.tuning,
            bounds: self.bounds,
        };
        let color_mode = self.params.color_mode;

        for particle in &mut self.particles {
            particle.update(&ctx, &mut self.rng);
            particle.display(color_mode, frame_count, field, &self.tuning, renderer);
        }
    }

    /// Grows with fresh particles or truncates the tail so exactly `count`
    /// particles remain, and makes `count` the new target.
    pub fn resize_population(&mut self, count: usize) {
        let before = self.particles.len();
        if count > before {
            self.particles.reserve(count - before);
            for _ in before..count {
                let particle = Particle::spawn(&mut self.rng, self.bounds, &self.tuning, self.params.particle_size);
                self.particles.push(particle);
            }
        } else {
            self.particles.truncate(count);
        }
        self.params.particle_count = count;
        debug!("population resized from {before} to {count}");
    }

    /// Drops a batch of ripple particles around `at`, then evicts the oldest
    /// particles while the pool is over the soft cap.
    pub fn pointer_moved(&mut self, at: Vector2<f32>) {
        for _ in 0..self.tuning.ripple_batch {
            let ripple = Particle::ripple(
                &mut self.rng,
                at,
                self.bounds,
                &self.tuning,
                self.params.particle_size,
            );
            self.particles.push(ripple);
        }
        trace!("spawned {} ripples at ({}, {})", self.tuning.ripple_batch, at.x, at.y);

        let cap = self.soft_cap();
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
            debug!("evicted {excess} oldest particles");
        }
    }

    /// New canvas dimensions. Existing particles keep their positions.
    pub fn resize_canvas(&mut self, bounds: Bounds) {
        if bounds != self.bounds {
            debug!("canvas bounds {}x{}", bounds.width, bounds.height);
            self.bounds = bounds;
        }
    }

    pub fn apply_control(&mut self, change: ControlChange) {
        debug!("control {} changed: {change:?}", change.control());
        match change {
            ControlChange::ParticleCount(count) => self.resize_population(count),
            other => other.apply_to(&mut self.params),
        }
    }

    /// Applies queued control changes, then queued pointer moves, each in
    /// arrival order.
    pub fn drain_input(&mut self, input: &mut InputQueue) {
        for change in input.drain_controls() {
            self.apply_control(change);
        }
        for position in input.drain_pointer_moves() {
            self.pointer_moved(position);
        }
    }
}
