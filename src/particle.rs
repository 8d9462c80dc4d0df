use cgmath::{InnerSpace, Vector2, Zero, vec2};
use rand::Rng;

use crate::field::NoiseSource;
use crate::input::PointerState;
use crate::params::{Bounds, ColorMode, Params, Tuning, remap};
use crate::render::{Hsba, Renderer};

const VIVID_SATURATION: f32 = 80.0;
const VIVID_BRIGHTNESS: f32 = 100.0;
const MONOCHROME_HUE: f32 = 220.0;
const MONOCHROME_SATURATION: f32 = 70.0;
/// Brightness at the slow and fast ends of `Tuning::speed_range`.
const MONOCHROME_BRIGHTNESS: std::ops::Range<f32> = 30.0..100.0;

/// Everything a particle reads during one update.
pub struct UpdateContext<'a, N: ?Sized> {
    pub field: &'a N,
    pub pointer: PointerState,
    pub time: u64,
    pub params: &'a Params,
    pub tuning: &'a Tuning,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    /// Heading in radians, re-derived from the flow field every update.
    pub angle: f32,
    pub speed: f32,
    /// Base display diameter. Survives `reset`.
    pub size: f32,
    pub lifespan: u32,
    pub max_life: u32,
    /// Hue in degrees, `[0, 360)`.
    pub hue: f32,
}

impl Particle {
    /// A freshly randomized particle whose size is drawn from
    /// `tuning.size_range * base_size`.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds, tuning: &Tuning, base_size: f32) -> Self {
        let mut particle = Self {
            position: Vector2::zero(),
            velocity: Vector2::zero(),
            angle: 0.0,
            speed: tuning.speed_range.start,
            size: uniform(rng, tuning.size_range.start, tuning.size_range.end) * base_size,
            lifespan: *tuning.life_range.start(),
            max_life: *tuning.life_range.start(),
            hue: 0.0,
        };
        particle.reset(rng, bounds, tuning);
        particle
    }

    /// A short-lived particle dropped near the pointer.
    pub fn ripple<R: Rng + ?Sized>(
        rng: &mut R,
        at: Vector2<f32>,
        bounds: Bounds,
        tuning: &Tuning,
        base_size: f32,
    ) -> Self {
        let mut particle = Self::spawn(rng, bounds, tuning, base_size);
        let jitter = tuning.ripple_jitter;
        particle.position = at + vec2(
            uniform(rng, -jitter, jitter),
            uniform(rng, -jitter, jitter),
        );
        particle.size = uniform(rng, tuning.ripple_size_range.start, tuning.ripple_size_range.end) * base_size;
        particle.lifespan = rng.gen_range(tuning.ripple_life_range.clone());
        particle.max_life = particle.lifespan;
        particle
    }

    /// Reinitializes the slot in place: random position over the bounds, zero
    /// velocity, random heading, speed, lifespan and hue.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, bounds: Bounds, tuning: &Tuning) {
        self.position = vec2(uniform(rng, 0.0, bounds.width), uniform(rng, 0.0, bounds.height));
        self.velocity = Vector2::zero();
        self.angle = uniform(rng, 0.0, std::f32::consts::TAU);
        self.speed = uniform(rng, tuning.speed_range.start, tuning.speed_range.end);
        self.lifespan = rng.gen_range(tuning.life_range.clone());
        self.max_life = self.lifespan;
        self.hue = uniform(rng, 0.0, 360.0);
    }

    pub fn update<N, R>(&mut self, ctx: &UpdateContext<'_, N>, rng: &mut R)
    where
        N: NoiseSource + ?Sized,
        R: Rng + ?Sized,
    {
        let tuning = ctx.tuning;
        let scale = ctx.params.noise_scale;
        let t = ctx.time as f64 * ctx.params.noise_speed;
        let sample = ctx.field.sample(
            self.position.x as f64 * scale,
            self.position.y as f64 * scale,
            t,
        );
        self.angle = remap(sample as f32, 0.0, 1.0, 0.0, tuning.angle_span);

        let mut influence = 0.0;
        if ctx.pointer.pressed {
            let away = self.position - ctx.pointer.position;
            let distance = away.magnitude();
            if distance < tuning.pointer_radius {
                influence = remap(distance, 0.0, tuning.pointer_radius, 1.0, 0.0);
                let heading = away.y.atan2(away.x);
                self.velocity += vec2(heading.cos(), heading.sin()) * influence * tuning.pointer_push;
            }
        }

        self.velocity += vec2(self.angle.cos(), self.angle.sin()) * self.speed * (1.0 - influence);
        self.velocity *= tuning.friction;
        self.position += self.velocity;
        self.wrap(ctx.bounds);

        self.lifespan = self.lifespan.saturating_sub(1);
        if self.lifespan == 0 {
            self.reset(rng, ctx.bounds, tuning);
        }
    }

    /// Toroidal wrap. Only coordinates strictly outside `[0, bound]` move, and
    /// one that leaves through zero lands exactly on the far bound.
    pub fn wrap(&mut self, bounds: Bounds) {
        if self.position.x < 0.0 {
            self.position.x = bounds.width;
        }
        if self.position.x > bounds.width {
            self.position.x = 0.0;
        }
        if self.position.y < 0.0 {
            self.position.y = bounds.height;
        }
        if self.position.y > bounds.height {
            self.position.y = 0.0;
        }
    }

    /// Opacity from remaining life, `255` when fresh and `0` at death.
    pub fn alpha(&self) -> f32 {
        remap(self.lifespan as f32, 0.0, self.max_life as f32, 0.0, 255.0)
    }

    /// Drawn diameter, shrinking to half of `size` as the particle dies.
    pub fn display_size(&self) -> f32 {
        self.size * remap(self.lifespan as f32, 0.0, self.max_life as f32, 0.5, 1.0)
    }

    pub fn color<N: NoiseSource + ?Sized>(
        &self,
        mode: ColorMode,
        frame_count: u64,
        field: &N,
        tuning: &Tuning,
    ) -> Hsba {
        let alpha = self.alpha();
        let drift = frame_count as f64 * tuning.hue_drift;
        match mode {
            ColorMode::Rainbow => {
                let hue = (self.hue as f64 + drift) % 360.0;
                Hsba::new(hue as f32, VIVID_SATURATION, VIVID_BRIGHTNESS, alpha)
            }
            ColorMode::Monochrome => {
                let speed = &tuning.speed_range;
                let brightness = remap(
                    self.speed,
                    speed.start,
                    speed.end,
                    MONOCHROME_BRIGHTNESS.start,
                    MONOCHROME_BRIGHTNESS.end,
                );
                Hsba::new(MONOCHROME_HUE, MONOCHROME_SATURATION, brightness, alpha)
            }
            ColorMode::Complementary => {
                let base = drift % 360.0;
                let scale = tuning.field_hue_scale;
                let offset = field.sample(self.position.x as f64 * scale, self.position.y as f64 * scale, 0.0);
                let hue = (base + offset * tuning.field_hue_span) % 360.0;
                Hsba::new(hue as f32, VIVID_SATURATION, VIVID_BRIGHTNESS, alpha)
            }
        }
    }

    /// Draws the particle, plus a faint halo in its own hue once it is larger
    /// than the glow threshold.
    pub fn display<N, D>(&self, mode: ColorMode, frame_count: u64, field: &N, tuning: &Tuning, renderer: &mut D)
    where
        N: NoiseSource + ?Sized,
        D: Renderer + ?Sized,
    {
        let size = self.display_size();
        renderer.fill_circle(self.position, size, self.color(mode, frame_count, field, tuning));

        if size > tuning.glow_threshold {
            let halo = Hsba::new(self.hue, VIVID_SATURATION, VIVID_BRIGHTNESS, self.alpha() * tuning.glow_alpha);
            renderer.fill_circle(self.position, size * 2.0, halo);
        }
    }
}

/// Uniform sample from `[low, high)`, or `low` when the range is empty.
fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low { rng.gen_range(low..high) } else { low }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawCall;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const BOUNDS: Bounds = Bounds {
        width: 800.0,
        height: 600.0,
    };

    fn flat(value: f64) -> impl Fn(f64, f64, f64) -> f64 {
        move |_, _, _| value
    }

    fn still_particle(position: Vector2<f32>) -> Particle {
        Particle {
            position,
            velocity: Vector2::zero(),
            angle: 0.0,
            speed: 1.0,
            size: 4.0,
            lifespan: 150,
            max_life: 150,
            hue: 90.0,
        }
    }

    fn context<'a, N>(field: &'a N, params: &'a Params, tuning: &'a Tuning, pointer: PointerState) -> UpdateContext<'a, N> {
        UpdateContext {
            field,
            pointer,
            time: 1,
            params,
            tuning,
            bounds: BOUNDS,
        }
    }

    #[test]
    fn reset_stays_in_documented_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        let tuning = Tuning::default();
        let mut particle = Particle::spawn(&mut rng, BOUNDS, &tuning, 3.0);
        for _ in 0..1000 {
            particle.velocity = vec2(9.0, 9.0);
            particle.reset(&mut rng, BOUNDS, &tuning);
            assert!((0.0..800.0).contains(&particle.position.x));
            assert!((0.0..600.0).contains(&particle.position.y));
            assert_eq!(particle.velocity, Vector2::zero());
            assert!((0.0..std::f32::consts::TAU).contains(&particle.angle));
            assert!((0.5..=2.0).contains(&particle.speed));
            assert!((100..=200).contains(&particle.lifespan));
            assert_eq!(particle.max_life, particle.lifespan);
            assert!((0.0..360.0).contains(&particle.hue));
        }
    }

    #[test]
    fn reset_keeps_size() {
        let mut rng = StdRng::seed_from_u64(2);
        let tuning = Tuning::default();
        let mut particle = Particle::spawn(&mut rng, BOUNDS, &tuning, 3.0);
        assert!((3.0..9.0).contains(&particle.size));
        let size = particle.size;
        particle.reset(&mut rng, BOUNDS, &tuning);
        assert_eq!(particle.size, size);
    }

    #[test]
    fn ripple_is_short_lived_and_near_the_pointer() {
        let mut rng = StdRng::seed_from_u64(3);
        let tuning = Tuning::default();
        for _ in 0..200 {
            let p = Particle::ripple(&mut rng, vec2(100.0, 50.0), BOUNDS, &tuning, 2.0);
            assert!((p.position.x - 100.0).abs() <= 10.0);
            assert!((p.position.y - 50.0).abs() <= 10.0);
            assert!((4.0..10.0).contains(&p.size));
            assert!((20..=50).contains(&p.lifespan));
            assert_eq!(p.max_life, p.lifespan);
        }
    }

    #[test]
    fn zero_sized_bounds_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(4);
        let particle = Particle::spawn(&mut rng, Bounds::new(0.0, 0.0), &Tuning::default(), 1.0);
        assert_eq!(particle.position, Vector2::zero());
    }

    #[test]
    fn flow_sample_sets_doubled_angle() {
        let mut rng = StdRng::seed_from_u64(5);
        let (params, tuning) = (Params::default(), Tuning::default());
        let field = flat(0.25);
        let mut particle = still_particle(vec2(400.0, 300.0));
        particle.update(&context(&field, &params, &tuning, PointerState::default()), &mut rng);

        // 0.25 of [0, 4π) is a half turn: heading along -x.
        assert!((particle.angle - std::f32::consts::PI).abs() < 1e-5);
        assert!((particle.velocity.x + 0.95).abs() < 1e-5);
        assert!(particle.velocity.y.abs() < 1e-5);
        assert!((particle.position.x - (400.0 - 0.95)).abs() < 1e-3);
        assert_eq!(particle.lifespan, 149);
    }

    #[test]
    fn field_is_sampled_at_scaled_position_and_time() {
        let mut rng = StdRng::seed_from_u64(6);
        let params = Params {
            noise_scale: 0.5,
            noise_speed: 0.25,
            ..Params::default()
        };
        let tuning = Tuning::default();
        let seen = std::cell::Cell::new((0.0, 0.0, 0.0));
        let field = |x: f64, y: f64, t: f64| {
            seen.set((x, y, t));
            0.0
        };
        let mut particle = still_particle(vec2(10.0, 20.0));
        let mut ctx = context(&field, &params, &tuning, PointerState::default());
        ctx.time = 8;
        particle.update(&ctx, &mut rng);
        assert_eq!(seen.get(), (5.0, 10.0, 2.0));
    }

    #[test]
    fn pressed_pointer_pushes_away_and_mutes_the_flow() {
        let mut rng = StdRng::seed_from_u64(7);
        let (params, tuning) = (Params::default(), Tuning::default());
        let field = flat(0.0);
        let pointer = PointerState::new(vec2(400.0, 300.0), true);

        // 50 units right of the pointer: influence 0.75.
        let mut particle = still_particle(vec2(450.0, 300.0));
        particle.update(&context(&field, &params, &tuning, pointer), &mut rng);
        let expected = (0.75 * 0.5 + 1.0 * 0.25) * 0.95;
        assert!((particle.velocity.x - expected).abs() < 1e-5);

        // Above the pointer the push is along -y while the flow is along +x.
        let mut particle = still_particle(vec2(400.0, 200.0));
        particle.update(&context(&field, &params, &tuning, pointer), &mut rng);
        assert!((particle.velocity.y + 0.5 * 0.5 * 0.95).abs() < 1e-5);
        assert!((particle.velocity.x - 0.5 * 0.95).abs() < 1e-5);
    }

    #[test]
    fn pointer_outside_radius_or_released_has_no_effect() {
        let mut rng = StdRng::seed_from_u64(8);
        let (params, tuning) = (Params::default(), Tuning::default());
        let field = flat(0.0);
        for pointer in [
            PointerState::new(vec2(400.0, 300.0), false),
            PointerState::new(vec2(400.0, 500.0), true),
        ] {
            let mut particle = still_particle(vec2(400.0, 300.0));
            particle.update(&context(&field, &params, &tuning, pointer), &mut rng);
            assert!((particle.velocity.x - 0.95).abs() < 1e-5);
            assert!(particle.velocity.y.abs() < 1e-5);
        }
    }

    #[test]
    fn wrap_boundaries() {
        let mut particle = still_particle(vec2(800.0, 600.0));
        particle.wrap(BOUNDS);
        assert_eq!(particle.position, vec2(800.0, 600.0));

        particle.position = vec2(800.001, 600.001);
        particle.wrap(BOUNDS);
        assert_eq!(particle.position, vec2(0.0, 0.0));

        particle.position = vec2(-0.001, -0.001);
        particle.wrap(BOUNDS);
        assert_eq!(particle.position, vec2(800.0, 600.0));

        particle.position = vec2(0.0, 0.0);
        particle.wrap(BOUNDS);
        assert_eq!(particle.position, vec2(0.0, 0.0));
    }

    #[test]
    fn adversarial_velocity_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        let (params, tuning) = (Params::default(), Tuning::default());
        let field = flat(0.6);
        let mut particle = still_particle(vec2(10.0, 10.0));
        for step in 0..500 {
            particle.velocity = if step % 2 == 0 { vec2(1.0e6, -3.0e5) } else { vec2(-7.0e4, 9.0e6) };
            particle.update(&context(&field, &params, &tuning, PointerState::default()), &mut rng);
            assert!((0.0..=800.0).contains(&particle.position.x));
            assert!((0.0..=600.0).contains(&particle.position.y));
            assert!(particle.lifespan <= particle.max_life);
        }
    }

    #[test]
    fn exhausted_particle_resets_in_place() {
        let mut rng = StdRng::seed_from_u64(10);
        let (params, tuning) = (Params::default(), Tuning::default());
        let field = flat(0.5);
        let mut particle = still_particle(vec2(10.0, 10.0));
        particle.lifespan = 1;
        particle.velocity = vec2(3.0, 3.0);
        particle.update(&context(&field, &params, &tuning, PointerState::default()), &mut rng);
        assert!((100..=200).contains(&particle.lifespan));
        assert_eq!(particle.max_life, particle.lifespan);
        assert_eq!(particle.velocity, Vector2::zero());
        assert_eq!(particle.size, 4.0);
    }

    #[test]
    fn fade_follows_remaining_life() {
        let mut particle = still_particle(vec2(0.0, 0.0));
        assert_eq!(particle.alpha(), 255.0);
        assert_eq!(particle.display_size(), 4.0);
        particle.lifespan = 75;
        assert!((particle.alpha() - 127.5).abs() < 1e-4);
        assert!((particle.display_size() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn monochrome_brightness_tracks_speed() {
        let tuning = Tuning::default();
        let field = flat(0.0);
        let mut particle = still_particle(vec2(0.0, 0.0));
        particle.speed = 0.5;
        let slow = particle.color(ColorMode::Monochrome, 0, &field, &tuning);
        particle.speed = 2.0;
        let fast = particle.color(ColorMode::Monochrome, 0, &field, &tuning);
        assert_eq!(slow.brightness, 30.0);
        assert_eq!(fast.brightness, 100.0);
        assert_eq!((fast.hue, fast.saturation), (220.0, 70.0));
    }

    #[test]
    fn color_mapping_follows_tuning() {
        let tuning = Tuning {
            speed_range: 1.0..3.0,
            field_hue_scale: 0.5,
            field_hue_span: 90.0,
            ..Tuning::default()
        };
        let seen = std::cell::Cell::new((0.0, 0.0));
        let field = |x: f64, y: f64, _t: f64| {
            seen.set((x, y));
            0.5
        };
        let mut particle = still_particle(vec2(10.0, 20.0));

        particle.speed = 1.0;
        assert_eq!(particle.color(ColorMode::Monochrome, 0, &field, &tuning).brightness, 30.0);
        particle.speed = 3.0;
        assert_eq!(particle.color(ColorMode::Monochrome, 0, &field, &tuning).brightness, 100.0);

        let color = particle.color(ColorMode::Complementary, 0, &field, &tuning);
        assert!((color.hue - 45.0).abs() < 1e-4);
        assert_eq!(seen.get(), (5.0, 10.0));
    }

    #[test]
    fn rainbow_hue_drifts_with_frames() {
        let tuning = Tuning::default();
        let field = flat(0.0);
        let particle = still_particle(vec2(0.0, 0.0));
        let color = particle.color(ColorMode::Rainbow, 3000, &field, &tuning);
        assert!((color.hue - 30.0).abs() < 1e-3);
        assert_eq!((color.saturation, color.brightness, color.alpha), (80.0, 100.0, 255.0));
    }

    #[test]
    fn complementary_hue_offsets_by_field() {
        let tuning = Tuning::default();
        let seen = std::cell::Cell::new((0.0, 0.0, 1.0));
        let field = |x: f64, y: f64, t: f64| {
            seen.set((x, y, t));
            0.5
        };
        let particle = still_particle(vec2(100.0, 200.0));
        let color = particle.color(ColorMode::Complementary, 3500, &field, &tuning);
        assert!((color.hue - 80.0).abs() < 1e-3);
        let (x, y, t) = seen.get();
        assert!((x - 1.0).abs() < 1e-9 && (y - 2.0).abs() < 1e-9);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn display_adds_glow_for_large_particles() {
        let tuning = Tuning::default();
        let field = flat(0.0);
        let particle = still_particle(vec2(5.0, 6.0));
        let mut calls: Vec<DrawCall> = Vec::new();
        particle.display(ColorMode::Monochrome, 0, &field, &tuning, &mut calls);

        assert_eq!(calls.len(), 2);
        match calls[1] {
            DrawCall::Circle { center, diameter, color } => {
                assert_eq!(center, vec2(5.0, 6.0));
                assert_eq!(diameter, 8.0);
                assert_eq!(color.hue, 90.0);
                assert!((color.alpha - 76.5).abs() < 1e-4);
            }
            other => panic!("unexpected draw call {other:?}"),
        }
    }

    #[test]
    fn small_particles_have_no_glow() {
        let tuning = Tuning::default();
        let field = flat(0.0);
        let mut particle = still_particle(vec2(5.0, 6.0));
        particle.size = 2.0;
        let mut calls: Vec<DrawCall> = Vec::new();
        particle.display(ColorMode::Rainbow, 0, &field, &tuning, &mut calls);
        assert_eq!(calls.len(), 1);
    }
}
