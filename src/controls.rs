//! Binding between UI controls and simulation parameters.
//!
//! Controls deliver their values as strings (slider positions, a dropdown
//! selection). Parsing happens here; a value that does not parse is rejected
//! with a [`ControlError`] and the parameter keeps its previous value, so a
//! malformed input can never leak NaN into the particle state.

use std::fmt;
use std::str::FromStr;

use crate::error::ControlError;
use crate::params::{ColorMode, Params};

/// The UI controls that feed [`Params`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    ParticleCount,
    ParticleSize,
    NoiseScale,
    NoiseSpeed,
    ColorMode,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::ParticleCount,
        Control::ParticleSize,
        Control::NoiseScale,
        Control::NoiseSpeed,
        Control::ColorMode,
    ];

    /// Element id of the control in the page markup.
    pub fn id(self) -> &'static str {
        match self {
            Control::ParticleCount => "particleCount",
            Control::ParticleSize => "particleSize",
            Control::NoiseScale => "noiseScale",
            Control::NoiseSpeed => "noiseSpeed",
            Control::ColorMode => "colorMode",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Control::ParticleCount => "particle count",
            Control::ParticleSize => "particle size",
            Control::NoiseScale => "noise scale",
            Control::NoiseSpeed => "noise speed",
            Control::ColorMode => "color mode",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Control {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().trim_start_matches('#');
        Control::ALL
            .into_iter()
            .find(|control| control.id() == id)
            .ok_or_else(|| ControlError::UnknownControl(s.to_owned()))
    }
}

/// A typed parameter update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlChange {
    /// Resizes the population to exactly this many particles.
    ParticleCount(usize),
    /// Base size multiplier for new particles. Negative sizes are accepted;
    /// such particles draw nothing.
    ParticleSize(i32),
    NoiseScale(f64),
    NoiseSpeed(f64),
    ColorMode(ColorMode),
}

impl ControlChange {
    pub fn control(&self) -> Control {
        match self {
            ControlChange::ParticleCount(_) => Control::ParticleCount,
            ControlChange::ParticleSize(_) => Control::ParticleSize,
            ControlChange::NoiseScale(_) => Control::NoiseScale,
            ControlChange::NoiseSpeed(_) => Control::NoiseSpeed,
            ControlChange::ColorMode(_) => Control::ColorMode,
        }
    }

    /// Parses a raw control value.
    ///
    /// Integer controls accept decimal input and truncate it toward zero, the
    /// way a slider that reports `"12.0"` is expected to behave.
    pub fn parse(control: Control, raw: &str) -> Result<Self, ControlError> {
        let change = match control {
            Control::ParticleCount => {
                let count = parse_integer(control, raw)?;
                ControlChange::ParticleCount(
                    usize::try_from(count).map_err(|_| invalid_integer(control, raw))?,
                )
            }
            Control::ParticleSize => {
                let size = parse_integer(control, raw)?;
                ControlChange::ParticleSize(
                    i32::try_from(size).map_err(|_| invalid_integer(control, raw))?,
                )
            }
            Control::NoiseScale => ControlChange::NoiseScale(parse_float(control, raw)?),
            Control::NoiseSpeed => ControlChange::NoiseSpeed(parse_float(control, raw)?),
            Control::ColorMode => ControlChange::ColorMode(raw.parse()?),
        };
        Ok(change)
    }

    /// Parses a value addressed by control id, e.g. `("noiseScale", "0.02")`.
    pub fn from_input(id: &str, raw: &str) -> Result<Self, ControlError> {
        Self::parse(id.parse()?, raw)
    }

    /// Writes the change into `params`. Population changes only update the
    /// target here; resizing the collection is the simulation's job.
    pub fn apply_to(self, params: &mut Params) {
        match self {
            ControlChange::ParticleCount(count) => params.particle_count = count,
            ControlChange::ParticleSize(size) => params.particle_size = size as f32,
            ControlChange::NoiseScale(scale) => params.noise_scale = scale,
            ControlChange::NoiseSpeed(speed) => params.noise_speed = speed,
            ControlChange::ColorMode(mode) => params.color_mode = mode,
        }
    }
}

fn invalid_integer(control: Control, raw: &str) -> ControlError {
    ControlError::InvalidInteger {
        control: control.label(),
        value: raw.to_owned(),
    }
}

fn parse_integer(control: Control, raw: &str) -> Result<i64, ControlError> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() < i64::MAX as f64 => Ok(value.trunc() as i64),
        _ => Err(invalid_integer(control, raw)),
    }
}

fn parse_float(control: Control, raw: &str) -> Result<f64, ControlError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ControlError::InvalidFloat {
            control: control.label(),
            value: raw.to_owned(),
        })?;
    if !value.is_finite() {
        return Err(ControlError::NonFinite {
            control: control.label(),
            value: raw.to_owned(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_control() {
        assert_eq!(
            ControlChange::from_input("particleCount", "350"),
            Ok(ControlChange::ParticleCount(350))
        );
        assert_eq!(
            ControlChange::from_input("#particleSize", "4"),
            Ok(ControlChange::ParticleSize(4))
        );
        assert_eq!(
            ControlChange::from_input("noiseScale", "0.02"),
            Ok(ControlChange::NoiseScale(0.02))
        );
        assert_eq!(
            ControlChange::from_input("noiseSpeed", " 0.005 "),
            Ok(ControlChange::NoiseSpeed(0.005))
        );
        assert_eq!(
            ControlChange::from_input("colorMode", "complementary"),
            Ok(ControlChange::ColorMode(ColorMode::Complementary))
        );
    }

    #[test]
    fn integer_controls_truncate_decimals() {
        assert_eq!(
            ControlChange::parse(Control::ParticleCount, "12.9"),
            Ok(ControlChange::ParticleCount(12))
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            ControlChange::parse(Control::ParticleCount, "lots"),
            Err(ControlError::InvalidInteger { .. })
        ));
        assert!(matches!(
            ControlChange::parse(Control::ParticleCount, "-5"),
            Err(ControlError::InvalidInteger { .. })
        ));
        assert!(matches!(
            ControlChange::parse(Control::NoiseScale, ""),
            Err(ControlError::InvalidFloat { .. })
        ));
        assert!(matches!(
            ControlChange::parse(Control::NoiseSpeed, "NaN"),
            Err(ControlError::NonFinite { .. })
        ));
        assert!(matches!(
            ControlChange::parse(Control::NoiseScale, "inf"),
            Err(ControlError::NonFinite { .. })
        ));
        assert!(matches!(
            ControlChange::parse(Control::ParticleSize, "NaN"),
            Err(ControlError::InvalidInteger { .. })
        ));
        assert_eq!(
            ControlChange::from_input("gravity", "1"),
            Err(ControlError::UnknownControl("gravity".into()))
        );
    }

    #[test]
    fn out_of_range_values_pass_through() {
        assert_eq!(
            ControlChange::parse(Control::NoiseScale, "-3.5"),
            Ok(ControlChange::NoiseScale(-3.5))
        );
        assert_eq!(
            ControlChange::parse(Control::ParticleSize, "0"),
            Ok(ControlChange::ParticleSize(0))
        );
        assert_eq!(
            ControlChange::parse(Control::ParticleSize, "-2"),
            Ok(ControlChange::ParticleSize(-2))
        );

        let mut params = Params::default();
        ControlChange::ParticleSize(-2).apply_to(&mut params);
        assert_eq!(params.particle_size, -2.0);
    }

    #[test]
    fn apply_is_last_write_wins() {
        let mut params = Params::default();
        ControlChange::NoiseScale(0.02).apply_to(&mut params);
        ControlChange::NoiseScale(0.03).apply_to(&mut params);
        ControlChange::ParticleSize(7).apply_to(&mut params);
        ControlChange::ColorMode(ColorMode::Monochrome).apply_to(&mut params);
        assert_eq!(params.noise_scale, 0.03);
        assert_eq!(params.particle_size, 7.0);
        assert_eq!(params.color_mode, ColorMode::Monochrome);
    }

    #[test]
    fn change_reports_its_control() {
        assert_eq!(ControlChange::NoiseSpeed(0.1).control(), Control::NoiseSpeed);
        assert_eq!(Control::ColorMode.to_string(), "colorMode");
    }
}
