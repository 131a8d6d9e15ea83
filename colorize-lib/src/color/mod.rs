pub mod normalize;
pub mod palette;
pub mod substitute;

pub use normalize::{CanonicalColor, ColorNormalizer, CssColorNormalizer};
pub use palette::{Palette, PaletteEntry};
pub use substitute::substitute_colors;
