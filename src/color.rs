//! Color values used by materials, lights, backgrounds and fog.
//!
//! Colors are RGBA with `f32` components in `[0.0, 1.0]`. They can also be
//! built from the packed `0xRRGGBB` integers familiar from three.js:
//!
//! ```
//! use tre3d::color::{self, Color, ColorExt};
//!
//! let blue = Color::from_hex(0x4169e1);
//! assert_eq!(blue.to_hex(), color::ROYAL_BLUE.to_hex());
//! ```

pub use rgb::Rgba;

/// The color type used throughout tre3d. RGBA with f32 components in [0.0, 1.0].
pub type Color = Rgba<f32>;

/// Extension methods for packed-integer color conversions.
pub trait ColorExt {
    /// Builds an opaque color from a packed `0xRRGGBB` integer.
    fn from_hex(hex: u32) -> Color;

    /// Packs the RGB components back into a `0xRRGGBB` integer.
    ///
    /// The alpha channel is discarded; components are clamped to [0.0, 1.0].
    fn to_hex(&self) -> u32;
}

impl ColorExt for Color {
    fn from_hex(hex: u32) -> Color {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Color::new(r, g, b, 1.0)
    }

    fn to_hex(&self) -> u32 {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (quantize(self.r) << 16) | (quantize(self.g) << 8) | quantize(self.b)
    }
}

/// Black (0x000000).
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
/// White (0xffffff).
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
/// Red (0xff0000).
pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
/// Green (0x00ff00).
pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
/// Blue (0x0000ff).
pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
/// Yellow (0xffff00).
pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);
/// Cyan (0x00ffff).
pub const CYAN: Color = Color::new(0.0, 1.0, 1.0, 1.0);
/// Magenta (0xff00ff).
pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0, 1.0);
/// Orange (0xffa500).
pub const ORANGE: Color = Color::new(1.0, 0.64705884, 0.0, 1.0);
/// Gray (0x808080).
pub const GRAY: Color = Color::new(0.5019608, 0.5019608, 0.5019608, 1.0);
/// Dark gray (0x404040).
pub const DARK_GRAY: Color = Color::new(0.2509804, 0.2509804, 0.2509804, 1.0);
/// Royal blue (0x4169e1).
pub const ROYAL_BLUE: Color = Color::new(0.25490198, 0.4117647, 0.88235295, 1.0);
/// Cornflower blue (0x6495ed).
pub const CORNFLOWER_BLUE: Color = Color::new(0.39215687, 0.58431375, 0.92941177, 1.0);
/// Fully transparent black.
pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1.0 / 255.0;

    fn approx_eq(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < EPSILON
            && (a.g - b.g).abs() < EPSILON
            && (a.b - b.b).abs() < EPSILON
            && (a.a - b.a).abs() < EPSILON
    }

    #[test]
    fn from_hex_extracts_channels() {
        let c = Color::from_hex(0xff8000);
        assert!(approx_eq(c, Color::new(1.0, 0.5019608, 0.0, 1.0)));
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn named_colors_match_their_hex_codes() {
        assert!(approx_eq(Color::from_hex(0x4169e1), ROYAL_BLUE));
        assert!(approx_eq(Color::from_hex(0x6495ed), CORNFLOWER_BLUE));
        assert!(approx_eq(Color::from_hex(0x000000), BLACK));
        assert!(approx_eq(Color::from_hex(0xffffff), WHITE));
    }

    #[test]
    fn hex_round_trips() {
        for hex in [0x000000u32, 0xffffff, 0x4169e1, 0x123456, 0xabcdef] {
            assert_eq!(Color::from_hex(hex).to_hex(), hex);
        }
    }

    #[test]
    fn to_hex_clamps_out_of_range_components() {
        let c = Color::new(2.0, -1.0, 0.5, 1.0);
        assert_eq!(c.to_hex(), 0xff0080);
    }
}
