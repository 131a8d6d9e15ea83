use crate::dom::dom_tree::{self, Document, NodeRef};
use crate::style::css_matcher::{self, MatchedDeclaration, Origin};
use crate::style::owned_css::OwnedDeclaration;
use std::collections::HashMap;

/// Represents final set of CSS properties each element gets.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ComputedStyle {
    pub properties: HashMap<String, String>,
}

impl ComputedStyle {
    pub fn new() -> Self {
        ComputedStyle {
            properties: HashMap::new(),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }
}

/// SVG presentation attributes that carry a color.
const SVG_COLOR_ATTRIBUTES: [&str; 6] = [
    "color",
    "fill",
    "stroke",
    "stop-color",
    "flood-color",
    "lighting-color",
];

/// Resolve the computed style of `node` against the document's current
/// stylesheets, its own inline style and its ancestors.
///
/// Returns `None` for anything that is not an element.
pub fn compute_style(document: &Document, node: &NodeRef) -> Option<ComputedStyle> {
    let parent_style =
        dom_tree::parent_element(node).and_then(|parent| compute_style(document, &parent));

    let mut matched = Vec::new();
    if let Some(elem) = node.borrow().as_element().filter(|elem| elem.is_svg()) {
        for property in SVG_COLOR_ATTRIBUTES {
            let Some(value) = elem.attribute(property).map(str::trim) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            matched.push(MatchedDeclaration {
                declaration: OwnedDeclaration::new(property, value, false),
                origin: Origin::PresentationHint,
                specificity: (0, 0, 0),
                source_order: 0,
            });
        }
    }
    for rule in document.rules.borrow().iter() {
        if css_matcher::matches_complex_selector(node, &rule.selector) {
            let specificity = css_matcher::compute_complex_specificity(&rule.selector);
            matched.extend(rule.declarations.iter().map(|decl| MatchedDeclaration {
                declaration: decl.clone(),
                origin: Origin::Author,
                specificity,
                source_order: rule.source_order,
            }));
        }
    }

    let node_borrow = node.borrow();
    let elem = node_borrow.as_element()?;
    matched.extend(
        elem.inline_style
            .declarations
            .iter()
            .map(|decl| MatchedDeclaration {
                declaration: decl.clone(),
                origin: Origin::Inline,
                specificity: (0, 0, 0),
                source_order: 0,
            }),
    );

    Some(css_matcher::compute_computed_style(
        matched,
        parent_style.as_ref(),
        elem.is_svg(),
    ))
}
