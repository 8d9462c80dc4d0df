use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::str::FromStr;

use crate::error::ControlError;

/// How particles pick their fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// Each particle's own hue, drifting with the frame counter.
    #[default]
    Rainbow,
    /// Fixed blue hue, brightness from the particle's speed.
    Monochrome,
    /// A shared drifting base hue offset by the flow field under the particle.
    Complementary,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [
        ColorMode::Rainbow,
        ColorMode::Monochrome,
        ColorMode::Complementary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Rainbow => "rainbow",
            ColorMode::Monochrome => "monochrome",
            ColorMode::Complementary => "complementary",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rainbow" => Ok(ColorMode::Rainbow),
            "monochrome" => Ok(ColorMode::Monochrome),
            "complementary" => Ok(ColorMode::Complementary),
            other => Err(ControlError::UnknownColorMode(other.to_owned())),
        }
    }
}

/// The UI-tunable parameters. Writes are last-write-wins and take effect on
/// the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub noise_scale: f64,
    pub noise_speed: f64,
    /// Base size multiplier applied to newly constructed particles.
    pub particle_size: f32,
    /// Target population. Ripples may push the live count up to
    /// `particle_count + Tuning::ripple_headroom`.
    pub particle_count: usize,
    pub color_mode: ColorMode,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            noise_scale: 0.01,
            noise_speed: 0.001,
            particle_size: 3.0,
            particle_count: 200,
            color_mode: ColorMode::Rainbow,
        }
    }
}

/// Heuristic constants of the motion and drawing model.
///
/// The fixed color palettes (saturation and brightness per color mode) live
/// with the color mapping in `particle.rs`; the ranges they are mapped from
/// are tuned here.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    /// Velocity multiplier applied every frame.
    pub friction: f32,
    /// Span the `[0, 1)` noise sample is stretched over, in radians.
    pub angle_span: f32,
    pub pointer_radius: f32,
    pub pointer_push: f32,
    /// Spawn speed range, also the input range of monochrome brightness.
    pub speed_range: Range<f32>,
    pub life_range: RangeInclusive<u32>,
    /// Multiplier range for a particle's size, scaled by `Params::particle_size`.
    pub size_range: Range<f32>,
    pub ripple_batch: usize,
    pub ripple_jitter: f32,
    pub ripple_headroom: usize,
    pub ripple_size_range: Range<f32>,
    pub ripple_life_range: RangeInclusive<u32>,
    /// Hue degrees added per frame in the cycling color modes.
    pub hue_drift: f64,
    /// Spatial scale of the flow-field lookup in complementary mode.
    pub field_hue_scale: f64,
    /// Hue degrees the complementary lookup spreads `[0, 1)` over.
    pub field_hue_span: f64,
    pub glow_threshold: f32,
    pub glow_alpha: f32,
    /// Alpha (0..=255) of the black overlay drawn at the start of each frame.
    pub trail_alpha: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            friction: 0.95,
            angle_span: std::f32::consts::TAU * 2.0,
            pointer_radius: 200.0,
            pointer_push: 0.5,
            speed_range: 0.5..2.0,
            life_range: 100..=200,
            size_range: 1.0..3.0,
            ripple_batch: 3,
            ripple_jitter: 10.0,
            ripple_headroom: 20,
            ripple_size_range: 2.0..5.0,
            ripple_life_range: 20..=50,
            hue_drift: 0.1,
            field_hue_scale: 0.01,
            field_hue_span: 180.0,
            glow_threshold: 2.0,
            glow_alpha: 0.3,
            trail_alpha: 10.0,
        }
    }
}

/// Canvas dimensions, used as wrap bounds and spawn area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Linear re-map of `value` from `[in_low, in_high]` onto `[out_low, out_high]`.
/// Values outside the input range extrapolate.
pub fn remap(value: f32, in_low: f32, in_high: f32, out_low: f32, out_high: f32) -> f32 {
    if in_high == in_low {
        return out_low;
    }
    (value - in_low) / (in_high - in_low) * (out_high - out_low) + out_low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_mode_round_trips_names() {
        for mode in ColorMode::ALL {
            assert_eq!(mode.as_str().parse::<ColorMode>(), Ok(mode));
        }
        assert_eq!(" monochrome ".parse::<ColorMode>(), Ok(ColorMode::Monochrome));
    }

    #[test]
    fn unknown_color_mode_is_rejected() {
        assert_eq!(
            "sepia".parse::<ColorMode>(),
            Err(ControlError::UnknownColorMode("sepia".into()))
        );
    }

    #[test]
    fn remap_hits_endpoints_exactly() {
        assert_eq!(remap(0.5, 0.5, 2.0, 30.0, 100.0), 30.0);
        assert_eq!(remap(2.0, 0.5, 2.0, 30.0, 100.0), 100.0);
        assert_eq!(remap(0.0, 0.0, 150.0, 0.0, 255.0), 0.0);
        assert_eq!(remap(150.0, 0.0, 150.0, 0.5, 1.0), 1.0);
    }

    #[test]
    fn remap_degenerate_input_range() {
        assert_eq!(remap(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn defaults_match_the_sketch() {
        let params = Params::default();
        assert_eq!(params.particle_count, 200);
        assert_eq!(params.color_mode, ColorMode::Rainbow);
        let tuning = Tuning::default();
        assert_eq!(tuning.ripple_batch, 3);
        assert_eq!(tuning.ripple_headroom, 20);
        assert!((tuning.angle_span - 4.0 * std::f32::consts::PI).abs() < 1e-6);
    }
}
