use crate::color::normalize::{CanonicalColor, ColorNormalizer};
use crate::error::ColorizeError;

/// One "old color -> replacement" pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Canonical form of the old color; always recognized.
    pub original: CanonicalColor,
    /// The old color as it was authored, kept for log messages.
    pub source: String,
    /// Emitted verbatim; never normalized for output.
    pub replacement: String,
}

/// Immutable mapping from canonical old colors to replacement values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

/// The built-in re-skin table, replacement first.
const STOCK_TABLE: &[(&str, &[&str])] = &[
    ("lightsteelblue", &["#f8f7f6"]),
    ("lightgrey", &["#fcfcfc"]),
];

impl Palette {
    /// Builds the palette from its authoring form: each replacement with the
    /// old colors it stands in for.
    ///
    /// An old color listed twice keeps the later replacement. Fails when an
    /// old color is not a color at all, or when a replacement is itself the
    /// color of a different entry (a later pass would rewrite it again).
    pub fn build<R, O, S, N>(reverse_map: R, normalizer: &N) -> Result<Palette, ColorizeError>
    where
        R: IntoIterator<Item = (S, O)>,
        O: IntoIterator<Item = S>,
        S: AsRef<str>,
        N: ColorNormalizer + ?Sized,
    {
        let mut entries: Vec<PaletteEntry> = Vec::new();

        for (replacement, originals) in reverse_map {
            let replacement = replacement.as_ref();
            for original in originals {
                let source = original.as_ref();
                let canonical = normalizer.normalize(source);
                if !canonical.is_recognized() {
                    return Err(ColorizeError::UnrecognizedColor(source.to_string()));
                }

                match entries.iter_mut().find(|e| e.original == canonical) {
                    Some(existing) => {
                        log::warn!(
                            "palette color {} ({}) mapped to both '{}' and '{}'; keeping '{}'",
                            source,
                            canonical,
                            existing.replacement,
                            replacement,
                            replacement
                        );
                        existing.source = source.to_string();
                        existing.replacement = replacement.to_string();
                    }
                    None => entries.push(PaletteEntry {
                        original: canonical,
                        source: source.to_string(),
                        replacement: replacement.to_string(),
                    }),
                }
            }
        }

        for entry in &entries {
            let replaced = normalizer.normalize(&entry.replacement);
            if !replaced.is_recognized() {
                continue;
            }
            if let Some(other) = entries
                .iter()
                .find(|other| other.original == replaced && other.original != entry.original)
            {
                return Err(ColorizeError::ReplacementCollides {
                    replacement: entry.replacement.clone(),
                    original: other.source.clone(),
                });
            }
        }

        log::debug!("built palette with {} entries", entries.len());
        Ok(Palette { entries })
    }

    pub fn get(&self, color: &CanonicalColor) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.original == *color)
            .map(|entry| entry.replacement.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stock table in its authoring form.
    pub fn stock_table() -> Vec<(String, Vec<String>)> {
        STOCK_TABLE
            .iter()
            .map(|(replacement, originals)| {
                (
                    replacement.to_string(),
                    originals.iter().map(|o| o.to_string()).collect(),
                )
            })
            .collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            entries: vec![
                PaletteEntry {
                    original: CanonicalColor::from_rgba(0xf8, 0xf7, 0xf6, 0xff),
                    source: "#f8f7f6".to_string(),
                    replacement: "lightsteelblue".to_string(),
                },
                PaletteEntry {
                    original: CanonicalColor::from_rgba(0xfc, 0xfc, 0xfc, 0xff),
                    source: "#fcfcfc".to_string(),
                    replacement: "lightgrey".to_string(),
                },
            ],
        }
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::normalize::CssColorNormalizer;
    use pretty_assertions::assert_eq;

    #[test]
    fn stock_table_builds_two_entries() {
        let palette = Palette::build(Palette::stock_table(), &CssColorNormalizer).unwrap();
        assert_eq!(palette.len(), 2);

        let n = CssColorNormalizer;
        assert_eq!(palette.get(&n.normalize("#f8f7f6")), Some("lightsteelblue"));
        assert_eq!(palette.get(&n.normalize("#fcfcfc")), Some("lightgrey"));
        assert_eq!(palette.get(&n.normalize("#000")), None);
    }

    #[test]
    fn default_matches_stock_table() {
        let built = Palette::build(Palette::stock_table(), &CssColorNormalizer).unwrap();
        assert_eq!(Palette::default(), built);
    }

    #[test]
    fn several_originals_share_a_replacement() {
        let palette = Palette::build(
            vec![("navy", vec!["#fff", "rgb(250, 250, 250)", "hsl(0, 0%, 95%)"])],
            &CssColorNormalizer,
        )
        .unwrap();
        assert_eq!(palette.len(), 3);
        assert!(palette.iter().all(|e| e.replacement == "navy"));
        let white = CanonicalColor::from_rgba(255, 255, 255, 255);
        assert_eq!(palette.get(&white), Some("navy"));
    }

    #[test]
    fn equivalent_originals_collapse_last_writer_wins() {
        let palette = Palette::build(
            vec![("navy", vec!["#f8f7f6"]), ("teal", vec!["rgb(248, 247, 246)"])],
            &CssColorNormalizer,
        )
        .unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.iter().next().unwrap().replacement, "teal");
    }

    #[test]
    fn unrecognized_original_is_rejected() {
        let err = Palette::build(vec![("navy", vec!["no-such-color"])], &CssColorNormalizer)
            .unwrap_err();
        assert!(matches!(err, ColorizeError::UnrecognizedColor(c) if c == "no-such-color"));
    }

    #[test]
    fn replacement_equal_to_another_original_is_rejected() {
        let err = Palette::build(
            vec![("white", vec!["#f8f7f6"]), ("black", vec!["#ffffff"])],
            &CssColorNormalizer,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ColorizeError::ReplacementCollides { ref replacement, ref original }
                if replacement == "white" && original == "#ffffff"
        ));
    }

    #[test]
    fn replacement_equal_to_its_own_original_is_allowed() {
        let palette = Palette::build(vec![("red", vec!["#f00"])], &CssColorNormalizer).unwrap();
        assert_eq!(palette.len(), 1);
    }
}
