//! Startup configuration: the palette table and the reactor strategy.
//!
//! ```json
//! {
//!   "palette": { "lightsteelblue": ["#f8f7f6"], "lightgrey": ["#fcfcfc"] },
//!   "reactor": { "mode": "poll", "interval_ms": 10000 }
//! }
//! ```
//!
//! Every field is optional. A missing palette means the stock table, a
//! missing reactor means mutation observation.

use crate::color::normalize::ColorNormalizer;
use crate::color::palette::Palette;
use crate::error::ColorizeError;
use crate::recolor::reactor::Strategy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ReactorConfig {
    #[default]
    Observe,
    Poll {
        #[serde(default = "default_interval_ms")]
        interval_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorizeConfig {
    /// Replacement value -> the old colors it replaces, in authored order.
    /// An old color listed under two replacements goes to the later one.
    pub palette: IndexMap<String, Vec<String>>,
    pub reactor: ReactorConfig,
}

impl Default for ColorizeConfig {
    fn default() -> Self {
        ColorizeConfig {
            palette: Palette::stock_table().into_iter().collect(),
            reactor: ReactorConfig::default(),
        }
    }
}

impl ColorizeConfig {
    pub fn from_json(text: &str) -> Result<Self, ColorizeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ColorizeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::debug!(
            "loaded config from {}: {} replacements",
            path.display(),
            config.palette.len()
        );
        Ok(config)
    }

    pub fn build_palette<N: ColorNormalizer + ?Sized>(
        &self,
        normalizer: &N,
    ) -> Result<Palette, ColorizeError> {
        let reverse_map = self.palette.iter().map(|(replacement, originals)| {
            (replacement.as_str(), originals.iter().map(String::as_str))
        });
        Palette::build(reverse_map, normalizer)
    }

    pub fn strategy(&self) -> Strategy {
        match self.reactor {
            ReactorConfig::Observe => Strategy::Observe,
            ReactorConfig::Poll { interval_ms } => Strategy::Poll {
                period: Duration::from_millis(interval_ms),
            },
        }
    }
}
