//! Re-skins HTML documents by overriding elements whose computed colors
//! match a small palette.
//!
//! The crate carries its own document model, stylesheet cascade and
//! mutation records so the override engine can run outside a browser.

pub mod color;
pub mod colorize_generate;
pub mod config;
pub mod dom;
pub mod error;
pub mod parser;
pub mod recolor;
pub mod style;

pub use color::{CanonicalColor, ColorNormalizer, CssColorNormalizer, Palette};
pub use config::ColorizeConfig;
pub use error::ColorizeError;
pub use recolor::{OverrideEngine, Reactor, StyleChannel, Strategy};
