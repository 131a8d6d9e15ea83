use crate::dom::dom_tree::{self, ElementNode, NodeRef};
use crate::style::computed::ComputedStyle;
use crate::style::owned_css::{OwnedDeclaration, OwnedStylesheet};
use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// ------------------------------
/// 1. Selector Parsing
/// ------------------------------

/// Supported attribute selector operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOperator {
    /// [attr="value"]
    Exact,
    /// [attr~="value"]
    Includes,
    /// [attr^="value"]
    Prefix,
    /// [attr$="value"]
    Suffix,
    /// [attr*="value"]
    Substring,
}

/// Represents one attribute condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<AttributeOperator>, // None means only existence check
    pub value: Option<String>,
}

/// A compound selector: optional tag, id, classes, attribute selectors and pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: HashSet<String>,
    pub attributes: Vec<AttributeSelector>,
    /// Pseudo-classes and pseudo-elements, without the leading colons.
    pub pseudo: Vec<String>,
}

/// A complex selector composed of a key compound selector and a list of ancestor parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub key: CompoundSelector,
    /// Ancestors with their combinators, in right-to-left order.
    pub ancestors: Vec<(Combinator, CompoundSelector)>,
}

/// Supported combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (a space).
    Descendant,
    /// Child combinator (`>`).
    Child,
    /// Adjacent sibling combinator (`+`).
    AdjacentSibling,
    /// General sibling combinator (`~`).
    GeneralSibling,
}

/// A helper that returns a parsed selector; if parsing fails, returns a fallback.
pub fn parse_selector(selector: &str) -> ComplexSelector {
    parse_complex_selector(selector).unwrap_or_else(|| ComplexSelector {
        key: parse_compound_selector(selector),
        ancestors: Vec::new(),
    })
}

fn is_compound_boundary(ch: char) -> bool {
    matches!(ch, '#' | '.' | '[' | ':')
}

/// Parse a compound selector string, e.g. "div.red#header[disabled][data-type~=\"main\"]"
pub fn parse_compound_selector(selector: &str) -> CompoundSelector {
    let mut tag = None;
    let mut id = None;
    let mut classes = HashSet::new();
    let mut attributes = Vec::new();
    let mut pseudo = Vec::new();
    let mut chars = selector.chars().peekable();
    let mut buffer = String::new();

    // If first char is alphabetic or '*' assume tag.
    if let Some(&ch) = chars.peek() {
        if ch.is_alphabetic() || ch == '*' {
            while let Some(&ch) = chars.peek() {
                if is_compound_boundary(ch) {
                    break;
                }
                buffer.push(ch);
                chars.next();
            }
            if !buffer.is_empty() && buffer != "*" {
                tag = Some(buffer.clone());
            }
            buffer.clear();
        }
    }

    while let Some(ch) = chars.next() {
        match ch {
            '#' | '.' => {
                while let Some(&next) = chars.peek() {
                    if is_compound_boundary(next) {
                        break;
                    }
                    buffer.push(next);
                    chars.next();
                }
                if !buffer.is_empty() {
                    if ch == '#' {
                        id = Some(buffer.clone());
                    } else {
                        classes.insert(buffer.clone());
                    }
                }
                buffer.clear();
            }
            ':' => {
                // `::before` and `:hover` alike; a parenthesised argument is kept verbatim.
                if chars.peek() == Some(&':') {
                    chars.next();
                }
                let mut depth = 0;
                while let Some(&next) = chars.peek() {
                    if depth == 0 && is_compound_boundary(next) {
                        break;
                    }
                    match next {
                        '(' => depth += 1,
                        ')' => depth -= 1,
                        _ => {}
                    }
                    buffer.push(next);
                    chars.next();
                }
                pseudo.push(buffer.to_ascii_lowercase());
                buffer.clear();
            }
            '[' => {
                if let Some(attr) = parse_attribute_selector(&mut chars) {
                    attributes.push(attr);
                }
            }
            _ => {}
        }
    }

    CompoundSelector {
        tag,
        id,
        classes,
        attributes,
        pseudo,
    }
}

fn skip_whitespace(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else {
            break;
        }
    }
}

/// Parse the inside of `[...]`; the opening bracket is already consumed.
fn parse_attribute_selector(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Option<AttributeSelector> {
    let mut attr_name = String::new();
    let mut operator: Option<AttributeOperator> = None;
    let mut attr_value: Option<String> = None;

    skip_whitespace(chars);
    while let Some(&ch) = chars.peek() {
        if matches!(ch, '=' | ']' | '~' | '^' | '$' | '*') || ch.is_whitespace() {
            break;
        }
        attr_name.push(ch);
        chars.next();
    }
    skip_whitespace(chars);

    if let Some(&ch) = chars.peek() {
        if matches!(ch, '=' | '~' | '^' | '$' | '*') {
            let mut op_str = String::new();
            op_str.push(ch);
            chars.next();
            if chars.peek() == Some(&'=') {
                op_str.push('=');
                chars.next();
            }
            operator = match op_str.as_str() {
                "=" => Some(AttributeOperator::Exact),
                "~=" => Some(AttributeOperator::Includes),
                "^=" => Some(AttributeOperator::Prefix),
                "$=" => Some(AttributeOperator::Suffix),
                "*=" => Some(AttributeOperator::Substring),
                _ => None,
            };
            skip_whitespace(chars);

            let mut value_buf = String::new();
            match chars.peek().copied() {
                Some(q) if q == '"' || q == '\'' => {
                    chars.next();
                    for ch in chars.by_ref() {
                        if ch == q {
                            break;
                        }
                        value_buf.push(ch);
                    }
                }
                _ => {
                    while let Some(&ch) = chars.peek() {
                        if ch.is_whitespace() || ch == ']' {
                            break;
                        }
                        value_buf.push(ch);
                        chars.next();
                    }
                }
            }
            attr_value = Some(value_buf);
        }
    }

    // Skip flags such as ` i` up to the closing bracket.
    for ch in chars.by_ref() {
        if ch == ']' {
            break;
        }
    }

    if attr_name.is_empty() {
        None
    } else {
        Some(AttributeSelector {
            name: attr_name,
            operator,
            value: attr_value,
        })
    }
}

/// Parse a complex selector string (e.g. "div.red > p#header + span.foo") into a ComplexSelector.
/// Assumes tokens are separated by whitespace, which is how lightningcss prints them.
pub fn parse_complex_selector(selector: &str) -> Option<ComplexSelector> {
    let mut iter = selector.split_whitespace();
    let mut key = parse_compound_selector(iter.next()?);
    let mut ancestors = Vec::new();

    while let Some(token) = iter.next() {
        let combinator = match token {
            ">" => Combinator::Child,
            "+" => Combinator::AdjacentSibling,
            "~" => Combinator::GeneralSibling,
            _ => Combinator::Descendant,
        };
        let compound_token = if combinator == Combinator::Descendant {
            token
        } else {
            iter.next()?
        };
        ancestors.push((combinator, key));
        key = parse_compound_selector(compound_token);
    }
    ancestors.reverse();
    Some(ComplexSelector { key, ancestors })
}

/// ------------------------------
/// 2. Specificity, Merging & Inheritance
/// ------------------------------

/// Compute specificity for a compound selector as (id_count, class+attribute+pseudo_count, tag_count)
pub fn compute_specificity(compound: &CompoundSelector) -> (u32, u32, u32) {
    let id_count = if compound.id.is_some() { 1 } else { 0 };
    let class_count = compound.classes.len() as u32;
    // Count each attribute and pseudo-class as a class-level selector.
    let attr_count = compound.attributes.len() as u32;
    let pseudo_count = compound.pseudo.len() as u32;
    let tag_count = if compound.tag.is_some() { 1 } else { 0 };
    (id_count, class_count + attr_count + pseudo_count, tag_count)
}

/// Compute specificity for a complex selector by summing key and ancestors.
pub fn compute_complex_specificity(selector: &ComplexSelector) -> (u32, u32, u32) {
    let mut spec = compute_specificity(&selector.key);
    for (_, comp) in &selector.ancestors {
        let anc_spec = compute_specificity(comp);
        spec.0 += anc_spec.0;
        spec.1 += anc_spec.1;
        spec.2 += anc_spec.2;
    }
    spec
}

/// Represents a CSS rule with a single selector.
#[derive(Debug, Clone)]
pub struct CssRule {
    pub selector: ComplexSelector,
    pub declarations: Vec<OwnedDeclaration>,
    pub source_order: u32,
}

/// Split every owned rule into one `CssRule` per selector, numbering them
/// in source order starting at `next_order`.
pub fn compile_rules(sheet: &OwnedStylesheet, next_order: &mut u32) -> Vec<CssRule> {
    let mut rules = Vec::new();
    for rule in &sheet.rules {
        for selector in &rule.selectors {
            rules.push(CssRule {
                selector: parse_selector(selector),
                declarations: rule.declarations.clone(),
                source_order: *next_order,
            });
        }
        *next_order += 1;
    }
    rules
}

/// Where a matched declaration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    /// An SVG presentation attribute such as `fill="..."`; loses to every author rule.
    PresentationHint,
    /// A `<style>` element or an added stylesheet.
    Author,
    /// The element's own `style` attribute.
    Inline,
}

/// A declaration that applies to one element, with everything needed to cascade it.
#[derive(Debug, Clone)]
pub struct MatchedDeclaration {
    pub declaration: OwnedDeclaration,
    pub origin: Origin,
    pub specificity: (u32, u32, u32),
    pub source_order: u32,
}

impl MatchedDeclaration {
    /// Cascade rank, lowest first: presentation hints, author normal, inline normal,
    /// author important, inline important.
    fn rank(&self) -> (bool, Origin, (u32, u32, u32), u32) {
        (
            self.declaration.important,
            self.origin,
            self.specificity,
            self.source_order,
        )
    }
}

const BORDER_SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

const CSS_WIDE_KEYWORDS: [&str; 5] = ["inherit", "initial", "unset", "revert", "revert-layer"];

/// Split `value` at top-level separators (outside parentheses), dropping empty pieces.
pub fn split_top_level(value: &str, is_separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && is_separator(ch) => {
                parts.push(&value[start..index]);
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn is_color_token(token: &str) -> bool {
    CssColor::parse_string(token).is_ok()
}

fn is_image_token(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    if lower == "none" {
        return true;
    }
    lower.contains('(')
        && (lower.contains("gradient") || lower.starts_with("url") || lower.starts_with("image"))
}

/// Expand the shorthands that carry colors into the longhands the engine reads.
/// `border` and `border-<side>` contribute their color (or `currentcolor`),
/// `border-color` takes one to four values, `background` splits into its
/// color and image layers. Anything else passes through unchanged.
fn expand_shorthand_properties(property: &str, value: &str) -> Vec<(String, String)> {
    let property = property.to_ascii_lowercase();
    let wide_keyword = CSS_WIDE_KEYWORDS
        .iter()
        .any(|kw| value.trim().eq_ignore_ascii_case(kw));

    match property.as_str() {
        "border" => {
            let color = if wide_keyword {
                value.trim()
            } else {
                split_top_level(value, char::is_whitespace)
                    .into_iter()
                    .find(|token| is_color_token(token))
                    .unwrap_or("currentcolor")
            };
            BORDER_SIDES
                .iter()
                .map(|side| (format!("border-{}-color", side), color.to_string()))
                .collect()
        }
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            let color = if wide_keyword {
                value.trim()
            } else {
                split_top_level(value, char::is_whitespace)
                    .into_iter()
                    .find(|token| is_color_token(token))
                    .unwrap_or("currentcolor")
            };
            vec![(format!("{}-color", property), color.to_string())]
        }
        "border-color" => {
            let values = split_top_level(value, char::is_whitespace);
            let (top, right, bottom, left) = match values.as_slice() {
                [all] => (*all, *all, *all, *all),
                [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
                [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
                [top, right, bottom, left] => (*top, *right, *bottom, *left),
                _ => return vec![(property, value.to_string())],
            };
            vec![
                ("border-top-color".to_string(), top.to_string()),
                ("border-right-color".to_string(), right.to_string()),
                ("border-bottom-color".to_string(), bottom.to_string()),
                ("border-left-color".to_string(), left.to_string()),
            ]
        }
        "background" => {
            if wide_keyword {
                return vec![
                    ("background-color".to_string(), value.trim().to_string()),
                    ("background-image".to_string(), value.trim().to_string()),
                ];
            }
            let layers = split_top_level(value, |ch| ch == ',');
            let mut images = Vec::new();
            let mut color = "transparent";
            for (index, layer) in layers.iter().enumerate() {
                let tokens = split_top_level(layer, char::is_whitespace);
                images.push(
                    tokens
                        .iter()
                        .find(|token| is_image_token(token))
                        .copied()
                        .unwrap_or("none"),
                );
                // Only the final layer may carry a color.
                if index + 1 == layers.len() {
                    if let Some(found) = tokens.iter().find(|token| is_color_token(token)) {
                        color = *found;
                    }
                }
            }
            let image = if images.iter().all(|img| *img == "none") {
                "none".to_string()
            } else {
                images.join(", ")
            };
            vec![
                ("background-color".to_string(), color.to_string()),
                ("background-image".to_string(), image),
            ]
        }
        _ => vec![(property, value.to_string())],
    }
}

/// Inherited properties; everything else resets to its initial value.
const INHERITABLE: [&str; 13] = [
    "color",
    "fill",
    "stroke",
    "font-size",
    "font-family",
    "line-height",
    "font-weight",
    "text-align",
    "visibility",
    "cursor",
    "letter-spacing",
    "word-spacing",
    "direction",
];

pub const INITIAL_COLOR: &str = "rgb(0, 0, 0)";
pub const INITIAL_BACKGROUND_COLOR: &str = "rgba(0, 0, 0, 0)";

/// Initial value of `property` for this element, if the engine cares about it.
fn initial_value(property: &str, is_svg: bool) -> Option<&'static str> {
    match property {
        "color" => Some(INITIAL_COLOR),
        "background-color" => Some(INITIAL_BACKGROUND_COLOR),
        "background-image" => Some("none"),
        "border-top-color" | "border-right-color" | "border-bottom-color" | "border-left-color" => {
            Some("currentcolor")
        }
        "fill" if is_svg => Some(INITIAL_COLOR),
        "stroke" if is_svg => Some("none"),
        _ => None,
    }
}

/// Compute the final computed style for an element by cascading its matched
/// declarations, expanding shorthands, resolving `inherit`/`initial`/`currentcolor`
/// and then applying inheritance and initial values.
/// `parent_style` is the computed style of the parent, if any.
pub fn compute_computed_style(
    matched: Vec<MatchedDeclaration>,
    parent_style: Option<&ComputedStyle>,
    is_svg: bool,
) -> ComputedStyle {
    let mut matched = matched;
    // Stable, so equal ranks keep their collection order.
    matched.sort_by_key(MatchedDeclaration::rank);

    let mut cascaded: HashMap<String, String> = HashMap::new();
    for m in matched {
        for (prop, value) in
            expand_shorthand_properties(&m.declaration.property, &m.declaration.value)
        {
            cascaded.insert(prop, value);
        }
    }

    let parent_value = |prop: &str| parent_style.and_then(|parent| parent.get(prop));
    let mut computed: HashMap<String, String> = HashMap::new();
    let mut reset: HashSet<String> = HashSet::new();

    for (prop, value) in cascaded {
        let keyword = value.trim().to_ascii_lowercase();
        let inherited = INHERITABLE.contains(&prop.as_str());
        match keyword.as_str() {
            "inherit" => {
                if let Some(v) = parent_value(&prop) {
                    computed.insert(prop, v.to_string());
                }
            }
            "initial" => {
                reset.insert(prop);
            }
            "unset" | "revert" | "revert-layer" => {
                if !inherited {
                    reset.insert(prop);
                }
            }
            "currentcolor" if prop == "color" => {
                if let Some(v) = parent_value(&prop) {
                    computed.insert(prop, v.to_string());
                }
            }
            _ => {
                computed.insert(prop, value);
            }
        }
    }

    // Extend with inherited values, then initial values.
    if let Some(parent) = parent_style {
        for prop in INHERITABLE.iter() {
            if !computed.contains_key(*prop) && !reset.contains(*prop) {
                if let Some(val) = parent.get(prop) {
                    computed.insert((*prop).to_string(), val.to_string());
                }
            }
        }
    }
    for prop in [
        "color",
        "background-color",
        "background-image",
        "border-top-color",
        "border-right-color",
        "border-bottom-color",
        "border-left-color",
        "fill",
        "stroke",
    ] {
        if !computed.contains_key(prop) {
            if let Some(initial) = initial_value(prop, is_svg) {
                computed.insert(prop.to_string(), initial.to_string());
            }
        }
    }

    let color = computed
        .get("color")
        .cloned()
        .unwrap_or_else(|| INITIAL_COLOR.to_string());
    for value in computed.values_mut() {
        if value.trim().eq_ignore_ascii_case("currentcolor") {
            *value = color.clone();
        }
    }

    ComputedStyle {
        properties: computed,
    }
}

/// ------------------------------
/// 3. Selector Matching
/// ------------------------------

/// Returns true if the given ElementNode matches the CompoundSelector.
/// Checks tag, id, classes, attribute conditions and pseudo-classes.
pub fn matches_compound(elem: &ElementNode, compound: &CompoundSelector) -> bool {
    if let Some(ref tag) = compound.tag {
        if !elem.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(ref id_val) = compound.id {
        if elem.attribute("id") != Some(id_val.as_str()) {
            return false;
        }
    }
    if !compound.classes.iter().all(|class| elem.has_class(class)) {
        return false;
    }
    // Only `:root` is evaluated; dynamic states and pseudo-elements never match.
    for pseudo in &compound.pseudo {
        if pseudo != "root" || !elem.tag.eq_ignore_ascii_case("html") {
            return false;
        }
    }
    // Check attribute selectors.
    for attr_sel in &compound.attributes {
        let Some(actual_val) = elem.attribute(&attr_sel.name) else {
            return false;
        };
        let Some(expected) = &attr_sel.value else {
            // If no expected value provided, existence is enough.
            continue;
        };
        let matched = match attr_sel.operator {
            Some(AttributeOperator::Exact) => actual_val == expected,
            // Treat actual value as space-separated words.
            Some(AttributeOperator::Includes) => {
                actual_val.split_whitespace().any(|word| word == expected)
            }
            Some(AttributeOperator::Prefix) => actual_val.starts_with(expected.as_str()),
            Some(AttributeOperator::Suffix) => actual_val.ends_with(expected.as_str()),
            Some(AttributeOperator::Substring) => actual_val.contains(expected.as_str()),
            None => true,
        };
        if !matched {
            return false;
        }
    }
    true
}

fn node_matches_compound(node: &NodeRef, compound: &CompoundSelector) -> bool {
    node.borrow()
        .as_element()
        .map(|elem| matches_compound(elem, compound))
        .unwrap_or(false)
}

/// Matches a ComplexSelector against a candidate element.
/// The matching proceeds right-to-left, using parent links and the parent's child list.
pub fn matches_complex_selector(candidate: &NodeRef, complex: &ComplexSelector) -> bool {
    if !node_matches_compound(candidate, &complex.key) {
        return false;
    }
    let mut current_node = Rc::clone(candidate);
    for (combinator, compound) in &complex.ancestors {
        let found = match combinator {
            Combinator::Child => dom_tree::parent_element(&current_node)
                .filter(|parent| node_matches_compound(parent, compound)),
            Combinator::Descendant => {
                let mut ancestor = dom_tree::parent_element(&current_node);
                while let Some(node) = ancestor.take() {
                    if node_matches_compound(&node, compound) {
                        ancestor = Some(node);
                        break;
                    }
                    ancestor = dom_tree::parent_element(&node);
                }
                ancestor
            }
            Combinator::AdjacentSibling => dom_tree::previous_element_siblings(&current_node)
                .into_iter()
                .next()
                .filter(|sibling| node_matches_compound(sibling, compound)),
            Combinator::GeneralSibling => dom_tree::previous_element_siblings(&current_node)
                .into_iter()
                .find(|sibling| node_matches_compound(sibling, compound)),
        };
        match found {
            Some(node) => current_node = node,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::dom_tree::new_document;

    // Helper to create a CompoundSelector easily.
    fn make_compound(tag: Option<&str>, id: Option<&str>, classes: &[&str]) -> CompoundSelector {
        let tag = tag.map(|t| t.to_string());
        let id = id.map(|i| i.to_string());
        let classes: HashSet<String> = classes.iter().map(|s| s.to_string()).collect();
        CompoundSelector {
            tag,
            id,
            classes,
            attributes: vec![],
            pseudo: vec![],
        }
    }

    // Helper to create a ComplexSelector from a CompoundSelector.
    fn make_complex(compound: CompoundSelector) -> ComplexSelector {
        ComplexSelector {
            key: compound,
            ancestors: vec![],
        }
    }

    fn author(
        selector: &ComplexSelector,
        property: &str,
        value: &str,
        important: bool,
        source_order: u32,
    ) -> MatchedDeclaration {
        MatchedDeclaration {
            declaration: OwnedDeclaration::new(property, value, important),
            origin: Origin::Author,
            specificity: compute_complex_specificity(selector),
            source_order,
        }
    }

    fn inline(property: &str, value: &str, important: bool) -> MatchedDeclaration {
        MatchedDeclaration {
            declaration: OwnedDeclaration::new(property, value, important),
            origin: Origin::Inline,
            specificity: (0, 0, 0),
            source_order: 0,
        }
    }

    // Test that a rule with higher specificity (ID selector) wins.
    #[test]
    fn test_specificity_wins() {
        let div = make_complex(make_compound(Some("div"), None, &[]));
        let blue = make_complex(make_compound(None, Some("blue"), &[]));

        let computed = compute_computed_style(
            vec![
                author(&blue, "color", "green", false, 2),
                author(&div, "color", "blue", false, 1),
            ],
            None,
            false,
        );
        assert_eq!(computed.get("color"), Some("green"));
    }

    // Test that when specificity is equal, source order wins.
    #[test]
    fn test_source_order() {
        let p = make_complex(make_compound(Some("p"), None, &[]));
        let computed = compute_computed_style(
            vec![
                author(&p, "background-color", "white", false, 2),
                author(&p, "background-color", "black", false, 1),
            ],
            None,
            false,
        );
        assert_eq!(computed.get("background-color"), Some("white"));
    }

    #[test]
    fn test_inline_and_important_precedence() {
        let id = make_complex(make_compound(None, Some("x"), &[]));
        let computed = compute_computed_style(
            vec![
                author(&id, "color", "red", false, 1),
                inline("color", "blue", false),
            ],
            None,
            false,
        );
        assert_eq!(computed.get("color"), Some("blue"));

        let computed = compute_computed_style(
            vec![
                author(&id, "color", "red", true, 1),
                inline("color", "blue", false),
            ],
            None,
            false,
        );
        assert_eq!(computed.get("color"), Some("red"));

        let computed = compute_computed_style(
            vec![
                author(&id, "color", "red", true, 1),
                inline("color", "lightsteelblue", true),
            ],
            None,
            false,
        );
        assert_eq!(computed.get("color"), Some("lightsteelblue"));
    }

    // Test inheritance: if a property is inheritable and not defined on the child, it should come from the parent.
    #[test]
    fn test_inheritance() {
        let parent = compute_computed_style(vec![inline("color", "red", false)], None, false);
        let computed = compute_computed_style(vec![], Some(&parent), false);
        assert_eq!(computed.get("color"), Some("red"));
        // Backgrounds do not inherit.
        assert_eq!(
            computed.get("background-color"),
            Some(INITIAL_BACKGROUND_COLOR)
        );
    }

    #[test]
    fn test_initial_values_and_current_color() {
        let computed = compute_computed_style(vec![inline("color", "#f8f7f6", false)], None, false);
        assert_eq!(computed.get("border-left-color"), Some("#f8f7f6"));
        assert_eq!(computed.get("background-image"), Some("none"));
        assert_eq!(computed.get("fill"), None);

        let svg = compute_computed_style(vec![], None, true);
        assert_eq!(svg.get("fill"), Some(INITIAL_COLOR));
        assert_eq!(svg.get("stroke"), Some("none"));
    }

    #[test]
    fn test_keyword_resolution() {
        let parent = compute_computed_style(
            vec![inline("background-color", "#fcfcfc", false), inline("color", "red", false)],
            None,
            false,
        );
        let computed = compute_computed_style(
            vec![
                inline("background-color", "inherit", false),
                inline("color", "initial", false),
            ],
            Some(&parent),
            false,
        );
        assert_eq!(computed.get("background-color"), Some("#fcfcfc"));
        assert_eq!(computed.get("color"), Some(INITIAL_COLOR));
    }

    // Test shorthand expansion for border and background.
    #[test]
    fn test_shorthand_border_expansion() {
        let computed = compute_computed_style(
            vec![inline("border", "1px solid #f8f7f6", false)],
            None,
            false,
        );
        for side in BORDER_SIDES {
            assert_eq!(
                computed.get(&format!("border-{}-color", side)),
                Some("#f8f7f6")
            );
        }

        let computed = compute_computed_style(
            vec![inline("border-color", "red blue", false)],
            None,
            false,
        );
        assert_eq!(computed.get("border-top-color"), Some("red"));
        assert_eq!(computed.get("border-right-color"), Some("blue"));
        assert_eq!(computed.get("border-bottom-color"), Some("red"));
        assert_eq!(computed.get("border-left-color"), Some("blue"));
    }

    #[test]
    fn test_shorthand_background_expansion() {
        let computed = compute_computed_style(
            vec![inline(
                "background",
                "linear-gradient(#f8f7f6, #000) no-repeat, #fcfcfc",
                false,
            )],
            None,
            false,
        );
        assert_eq!(
            computed.get("background-image"),
            Some("linear-gradient(#f8f7f6, #000), none")
        );
        assert_eq!(computed.get("background-color"), Some("#fcfcfc"));
    }

    #[test]
    fn test_split_top_level_respects_parentheses() {
        assert_eq!(
            split_top_level("rgb(1, 2, 3), red", |c| c == ','),
            vec!["rgb(1, 2, 3)", "red"]
        );
    }

    #[test]
    fn test_parse_compound_with_pseudo_and_attributes() {
        let compound = parse_compound_selector("a.nav[href^=\"http\"]:hover");
        assert_eq!(compound.tag.as_deref(), Some("a"));
        assert!(compound.classes.contains("nav"));
        assert_eq!(compound.attributes.len(), 1);
        assert_eq!(
            compound.attributes[0].operator,
            Some(AttributeOperator::Prefix)
        );
        assert_eq!(compound.pseudo, vec!["hover".to_string()]);
        assert_eq!(compute_specificity(&compound), (0, 3, 1));
    }

    #[test]
    fn test_complex_matching_against_tree() {
        let doc = new_document();
        let outer = doc.create_element("div");
        let first = doc.create_element("p");
        let second = doc.create_element("span");
        doc.append_child(&doc.root, &outer);
        doc.append_child(&outer, &first);
        doc.append_child(&outer, &second);
        doc.set_attribute(&outer, "class", "dark");

        assert!(matches_complex_selector(&second, &parse_selector(".dark span")));
        assert!(matches_complex_selector(&second, &parse_selector("div > span")));
        assert!(matches_complex_selector(&second, &parse_selector("p + span")));
        assert!(matches_complex_selector(&second, &parse_selector("p ~ span")));
        assert!(!matches_complex_selector(&first, &parse_selector("span + p")));
        assert!(!matches_complex_selector(&second, &parse_selector(".light span")));
        assert!(!matches_complex_selector(&second, &parse_selector("span:hover")));
    }
}
