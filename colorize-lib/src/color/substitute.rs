use crate::color::normalize::{CanonicalColor, ColorNormalizer};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Hex colors and the `rgb[a]()` / `hsl[a]()` functions, case-insensitive.
/// Functional tokens run to the first closing parenthesis.
static COLOR_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:rgba?|hsla?)\([^()]*\)|#[0-9a-f]{3,8}\b").expect("color token regex")
});

/// Replace every color token in `text` that normalizes to `target` with
/// `replacement`, leaving all other text byte-identical.
///
/// Returns `Cow::Borrowed(text)` when nothing matched, so callers can skip
/// the write.
pub fn substitute_colors<'a, N>(
    text: &'a str,
    target: &CanonicalColor,
    replacement: &str,
    normalizer: &N,
) -> Cow<'a, str>
where
    N: ColorNormalizer + ?Sized,
{
    if !target.is_recognized() {
        return Cow::Borrowed(text);
    }

    let mut substituted = false;
    let result = COLOR_TOKEN.replace_all(text, |caps: &Captures<'_>| {
        let token = &caps[0];
        if normalizer.normalize(token) == *target {
            substituted = true;
            replacement.to_string()
        } else {
            token.to_string()
        }
    });

    if substituted {
        Cow::Owned(result.into_owned())
    } else {
        Cow::Borrowed(text)
    }
}
