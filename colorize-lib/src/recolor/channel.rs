use crate::dom::dom_tree::{Document, NodeRef};
use crate::style::computed::ComputedStyle;
use std::fmt;

/// A style property the override engine monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleChannel {
    Text,
    Background,
    BorderTop,
    BorderRight,
    BorderBottom,
    BorderLeft,
    /// Only gradient-bearing values take part.
    BackgroundImage,
    Fill,
    Stroke,
}

impl StyleChannel {
    /// Every channel, in the order a single pass checks them.
    pub const ALL: [StyleChannel; 9] = [
        StyleChannel::Text,
        StyleChannel::Background,
        StyleChannel::BorderTop,
        StyleChannel::BorderRight,
        StyleChannel::BorderBottom,
        StyleChannel::BorderLeft,
        StyleChannel::BackgroundImage,
        StyleChannel::Fill,
        StyleChannel::Stroke,
    ];

    /// Longhand property read from the computed style and written inline.
    pub fn property(self) -> &'static str {
        match self {
            StyleChannel::Text => "color",
            StyleChannel::Background => "background-color",
            StyleChannel::BorderTop => "border-top-color",
            StyleChannel::BorderRight => "border-right-color",
            StyleChannel::BorderBottom => "border-bottom-color",
            StyleChannel::BorderLeft => "border-left-color",
            StyleChannel::BackgroundImage => "background-image",
            StyleChannel::Fill => "fill",
            StyleChannel::Stroke => "stroke",
        }
    }

    /// Whether the value is a composite string searched for color tokens
    /// rather than a single color.
    pub fn is_composite(self) -> bool {
        self == StyleChannel::BackgroundImage
    }

    /// Current computed value; `None` when the channel has nothing to offer,
    /// e.g. no paint on a plain HTML element or no gradient in the image.
    pub fn read(self, style: &ComputedStyle) -> Option<&str> {
        let value = style.get(self.property())?.trim();
        if value.is_empty() {
            return None;
        }
        if self.is_composite() && !is_gradient(value) {
            return None;
        }
        Some(value)
    }

    /// Writes `value` inline with `!important`. Returns whether anything changed.
    pub fn write(self, document: &Document, element: &NodeRef, value: &str) -> bool {
        document.set_style_property(element, self.property(), value, true)
    }
}

impl fmt::Display for StyleChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

fn is_gradient(value: &str) -> bool {
    !value.eq_ignore_ascii_case("none") && value.to_ascii_lowercase().contains("gradient")
}
