//! Canonical color form used for every equality check in the engine.

use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use std::fmt;

/// A color reduced to 8-bit sRGB channels, or the sentinel for input that
/// does not resolve to a color at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalColor {
    Rgba {
        red: u8,
        green: u8,
        blue: u8,
        alpha: u8,
    },
    Unrecognized,
}

impl CanonicalColor {
    /// Builds a canonical color the way a raster read-back reports it: a
    /// fully transparent pixel has no color left in it.
    pub fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        if alpha == 0 {
            return CanonicalColor::Rgba {
                red: 0,
                green: 0,
                blue: 0,
                alpha: 0,
            };
        }
        CanonicalColor::Rgba {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, CanonicalColor::Unrecognized)
    }
}

impl fmt::Display for CanonicalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalColor::Rgba {
                red,
                green,
                blue,
                alpha,
            } => write!(
                f,
                "rgba({}, {}, {}, {})",
                red,
                green,
                blue,
                f64::from(*alpha) / 255.0
            ),
            CanonicalColor::Unrecognized => f.write_str("unrecognized"),
        }
    }
}

/// Turns any textual color into its canonical form.
///
/// Implementations must be total and deterministic: garbage in gives
/// [`CanonicalColor::Unrecognized`], never a panic.
pub trait ColorNormalizer {
    fn normalize(&self, spec: &str) -> CanonicalColor;
}

impl<T: ColorNormalizer + ?Sized> ColorNormalizer for &T {
    fn normalize(&self, spec: &str) -> CanonicalColor {
        (**self).normalize(spec)
    }
}

/// Normalizer backed by the lightningcss color parser.
///
/// Accepts named colors, hex in 3/4/6/8 digits and every functional
/// notation lightningcss knows, then converts to sRGB bytes.
/// `currentcolor`, system colors and `var()` have no fixed value and come
/// back unrecognized.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssColorNormalizer;

impl ColorNormalizer for CssColorNormalizer {
    fn normalize(&self, spec: &str) -> CanonicalColor {
        let parsed = match CssColor::parse_string(spec.trim()) {
            Ok(color) => color,
            Err(_) => return CanonicalColor::Unrecognized,
        };
        match parsed.to_rgb() {
            Ok(CssColor::RGBA(rgba)) => {
                CanonicalColor::from_rgba(rgba.red, rgba.green, rgba.blue, rgba.alpha)
            }
            _ => CanonicalColor::Unrecognized,
        }
    }
}
