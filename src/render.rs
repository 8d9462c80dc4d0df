//! Drawing surface abstraction and a software canvas.
//!
//! The simulation emits two kinds of draw calls: a translucent black overlay
//! once per frame (which leaves fading trails behind moving particles) and
//! filled circles. [`Canvas`] rasterizes both into an RGBA image that a host
//! can upload as a texture; `Vec<DrawCall>` records them for inspection.

use cgmath::Vector2;
use eframe::egui::{Color32, ColorImage, ecolor::Hsva};

/// A color in hue/saturation/brightness space, in the ranges a sketching
/// library uses: hue `[0, 360)`, saturation and brightness `[0, 100]`,
/// alpha `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsba {
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub alpha: f32,
}

impl Hsba {
    pub fn new(hue: f32, saturation: f32, brightness: f32, alpha: f32) -> Self {
        Self {
            hue,
            saturation,
            brightness,
            alpha,
        }
    }

    /// RGB channels in `0..=255`, ignoring alpha.
    pub fn to_rgb(self) -> [u8; 3] {
        let hue = self.hue.rem_euclid(360.0) / 360.0;
        let saturation = (self.saturation / 100.0).clamp(0.0, 1.0);
        let value = (self.brightness / 100.0).clamp(0.0, 1.0);
        let [r, g, b] = Hsva::new(hue, saturation, value, 1.0).to_rgb();
        [unit_to_u8(r), unit_to_u8(g), unit_to_u8(b)]
    }

    /// Alpha as a `[0, 1]` blend factor.
    pub fn opacity(self) -> f32 {
        (self.alpha / 255.0).clamp(0.0, 1.0)
    }
}

fn unit_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Receiver of the simulation's draw calls.
pub trait Renderer {
    /// Covers the whole surface with black at `alpha` (0..=255).
    fn fade(&mut self, alpha: f32);

    /// Fills a circle without outline.
    fn fill_circle(&mut self, center: Vector2<f32>, diameter: f32, color: Hsba);
}

/// A recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCall {
    Fade {
        alpha: f32,
    },
    Circle {
        center: Vector2<f32>,
        diameter: f32,
        color: Hsba,
    },
}

impl Renderer for Vec<DrawCall> {
    fn fade(&mut self, alpha: f32) {
        self.push(DrawCall::Fade { alpha });
    }

    fn fill_circle(&mut self, center: Vector2<f32>, diameter: f32, color: Hsba) {
        self.push(DrawCall::Circle {
            center,
            diameter,
            color,
        });
    }
}

/// Software raster target. Pixels keep their contents between frames so the
/// per-frame fade produces motion trails.
pub struct Canvas {
    image: ColorImage,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            image: ColorImage::new([width, height], Color32::BLACK),
        }
    }

    pub fn width(&self) -> usize {
        self.image.size[0]
    }

    pub fn height(&self) -> usize {
        self.image.size[1]
    }

    /// Reallocates the surface, clearing it to black.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.image.size != [width, height] {
            log::debug!("canvas resized to {width}x{height}");
            self.image = ColorImage::new([width, height], Color32::BLACK);
        }
    }

    pub fn image(&self) -> &ColorImage {
        &self.image
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color32> {
        if x < self.width() && y < self.height() {
            Some(self.image.pixels[y * self.width() + x])
        } else {
            None
        }
    }

    fn blend_at(&mut self, x: usize, y: usize, rgb: [u8; 3], opacity: f32) {
        let index = y * self.width() + x;
        self.image.pixels[index] = blend(self.image.pixels[index], rgb, opacity);
    }
}

impl Renderer for Canvas {
    fn fade(&mut self, alpha: f32) {
        let opacity = (alpha / 255.0).clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        for pixel in &mut self.image.pixels {
            *pixel = blend(*pixel, [0, 0, 0], opacity);
        }
    }

    fn fill_circle(&mut self, center: Vector2<f32>, diameter: f32, color: Hsba) {
        let opacity = color.opacity();
        if opacity <= 0.0 || diameter <= 0.0 || !center.x.is_finite() || !center.y.is_finite() {
            return;
        }
        let rgb = color.to_rgb();
        let radius = diameter * 0.5;

        // Sub-pixel circles would miss every pixel center; splat them instead.
        if radius < std::f32::consts::FRAC_1_SQRT_2 {
            let (x, y) = (center.x.floor(), center.y.floor());
            if x >= 0.0 && y >= 0.0 && (x as usize) < self.width() && (y as usize) < self.height() {
                let coverage = (std::f32::consts::PI * radius * radius).min(1.0);
                self.blend_at(x as usize, y as usize, rgb, opacity * coverage);
            }
            return;
        }

        let min_x = (center.x - radius).floor().max(0.0) as usize;
        let min_y = (center.y - radius).floor().max(0.0) as usize;
        let max_x = ((center.x + radius).ceil().max(0.0) as usize).min(self.width());
        let max_y = ((center.y + radius).ceil().max(0.0) as usize).min(self.height());
        let radius_sq = radius * radius;

        for y in min_y..max_y {
            let dy = y as f32 + 0.5 - center.y;
            for x in min_x..max_x {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= radius_sq {
                    self.blend_at(x, y, rgb, opacity);
                }
            }
        }
    }
}

fn blend(dst: Color32, src: [u8; 3], opacity: f32) -> Color32 {
    let mix = |d: u8, s: u8| -> u8 {
        let d = d as f32;
        (d + (s as f32 - d) * opacity).round().clamp(0.0, 255.0) as u8
    };
    Color32::from_rgb(mix(dst.r(), src[0]), mix(dst.g(), src[1]), mix(dst.b(), src[2]))
}
