use crate::color::normalize::{ColorNormalizer, CssColorNormalizer};
use crate::color::palette::Palette;
use crate::color::substitute::substitute_colors;
use crate::dom::dom_tree::{Document, NodeRef};
use crate::recolor::channel::StyleChannel;
use std::borrow::Cow;

/// Applies palette overrides to one element at a time.
///
/// Reads the computed style once per call, then writes an inline
/// `!important` override for every channel whose value matches a palette
/// entry. Calling it again on an unchanged element writes nothing.
#[derive(Debug, Clone)]
pub struct OverrideEngine<N = CssColorNormalizer> {
    palette: Palette,
    normalizer: N,
}

impl<N: ColorNormalizer> OverrideEngine<N> {
    pub fn new(palette: Palette, normalizer: N) -> Self {
        OverrideEngine {
            palette,
            normalizer,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Override every matching channel of `element`; returns the number of
    /// inline properties that actually changed. Non-elements are ignored.
    pub fn override_element(&self, document: &Document, element: &NodeRef) -> usize {
        let Some(style) = document.computed_style(element) else {
            return 0;
        };

        let mut writes = 0;
        for channel in StyleChannel::ALL {
            let Some(value) = channel.read(&style) else {
                continue;
            };

            let replacement = if channel.is_composite() {
                self.substitute_all(value)
            } else {
                let canonical = self.normalizer.normalize(value);
                self.palette.get(&canonical).map(str::to_string)
            };

            if let Some(replacement) = replacement {
                if channel.write(document, element, &replacement) {
                    log::debug!("{}: {} -> {}", channel, value, replacement);
                    writes += 1;
                }
            }
        }
        writes
    }

    /// Runs every palette entry over a composite value; `None` if no token matched.
    fn substitute_all(&self, value: &str) -> Option<String> {
        let mut rewritten: Option<String> = None;
        for entry in &self.palette {
            let current = rewritten.as_deref().unwrap_or(value);
            let next = match substitute_colors(
                current,
                &entry.original,
                &entry.replacement,
                &self.normalizer,
            ) {
                Cow::Owned(text) => Some(text),
                Cow::Borrowed(_) => None,
            };
            if next.is_some() {
                rewritten = next;
            }
        }
        rewritten
    }
}

impl Default for OverrideEngine {
    fn default() -> Self {
        OverrideEngine::new(Palette::default(), CssColorNormalizer)
    }
}
