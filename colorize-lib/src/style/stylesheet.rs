use crate::error::ColorizeError;
use crate::style::owned_css::{InlineStyle, OwnedDeclaration, OwnedRule, OwnedStylesheet};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{style::StyleRule, CssRule};
use lightningcss::stylesheet::{ParserOptions, StyleAttribute, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;

fn parser_options<'o, 'i>() -> ParserOptions<'o, 'i> {
    // Pages in the wild are full of declarations lightningcss rejects; skip them instead of
    // dropping the whole sheet.
    ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    }
}

/// Parse a raw CSS string (LightningCSS) and convert it to a fully-owned stylesheet.
pub fn parse_stylesheet(css_text: &str) -> Result<OwnedStylesheet, ColorizeError> {
    let sheet = LightningStyleSheet::parse(css_text, parser_options())
        .map_err(|e| ColorizeError::Stylesheet(e.to_string()))?;

    let mut owned_rules = Vec::new();

    for rule in &sheet.rules.0 {
        match rule {
            CssRule::Style(style_rule) => {
                owned_rules.push(convert_style_rule(style_rule));
            }
            CssRule::Media(media_rule) => {
                // Media conditions are not evaluated; nested style rules always apply.
                for inner_rule in &media_rule.rules.0 {
                    if let CssRule::Style(sr) = inner_rule {
                        owned_rules.push(convert_style_rule(sr));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(OwnedStylesheet { rules: owned_rules })
}

/// Parse the contents of a `style="..."` attribute.
///
/// Never fails: declarations that do not parse are dropped, as a browser
/// drops them. Each declaration remembers the text it was written as.
pub fn parse_style_attribute(style_text: &str) -> InlineStyle {
    let mut style = InlineStyle::new();
    for source in split_declarations(style_text) {
        let attribute = match StyleAttribute::parse(source, parser_options()) {
            Ok(attribute) => attribute,
            Err(e) => {
                log::debug!("ignoring unparsable declaration {:?}: {}", source, e);
                continue;
            }
        };
        let mut parsed = convert_declaration_block(&attribute.declarations);
        if let [single] = parsed.as_mut_slice() {
            single.authored = Some(source.to_string());
        }
        for declaration in parsed {
            style.push_parsed(declaration);
        }
    }
    style
}

/// Split a declaration list at `;` outside strings and parentheses.
fn split_declarations(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (_, '\\') => escaped = true,
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                pieces.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Helper to copy a single StyleRule's selectors + declarations into OwnedRule.
fn convert_style_rule(style_rule: &StyleRule<'_>) -> OwnedRule {
    let mut selectors_vec = Vec::new();
    for selector in &style_rule.selectors.0 {
        if let Ok(sel_str) = selector.to_css_string(PrinterOptions::default()) {
            selectors_vec.push(sel_str);
        }
    }

    OwnedRule {
        selectors: selectors_vec,
        declarations: convert_declaration_block(&style_rule.declarations),
    }
}

/// Flatten a DeclarationBlock into owned declarations, normal ones first and
/// `!important` ones after, each tagged accordingly.
fn convert_declaration_block(block: &DeclarationBlock<'_>) -> Vec<OwnedDeclaration> {
    let normal = block.declarations.iter().map(|property| (property, false));
    let important = block
        .important_declarations
        .iter()
        .map(|property| (property, true));

    let mut decls_vec = Vec::new();
    for (property, is_important) in normal.chain(important) {
        let property_name = property.property_id().name().to_string();
        match property.value_to_css_string(PrinterOptions::default()) {
            Ok(property_value) => {
                decls_vec.push(OwnedDeclaration::new(
                    property_name,
                    property_value,
                    is_important,
                ));
            }
            Err(e) => {
                log::debug!("cannot print value of '{}': {}", property_name, e);
            }
        }
    }
    decls_vec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_and_flattens_media() {
        let sheet = parse_stylesheet(
            r#"
            .red { color: red; }
            @media screen { #main { background-color: #fcfcfc; } }
            @font-face { font-family: x; src: url(x.woff); }
            "#,
        )
        .unwrap();

        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].selectors, vec![".red".to_string()]);
        assert_eq!(sheet.rules[1].selectors, vec!["#main".to_string()]);
        assert_eq!(sheet.rules[1].declarations[0].property, "background-color");
    }

    #[test]
    fn keeps_important_flag() {
        let sheet = parse_stylesheet("p { color: red !important; margin: 0 }").unwrap();
        let decls = &sheet.rules[0].declarations;
        let color = decls.iter().find(|d| d.property == "color").unwrap();
        let margin = decls.iter().find(|d| d.property == "margin").unwrap();
        assert!(color.important);
        assert!(!margin.important);
    }

    #[test]
    fn selector_lists_are_kept_separately() {
        let sheet = parse_stylesheet("h1, .title { color: blue }").unwrap();
        assert_eq!(sheet.rules[0].selectors.len(), 2);
    }

    #[test]
    fn style_attribute_parses_declarations() {
        let style = parse_style_attribute("color: #f8f7f6; border-top-color: blue !important");
        assert_eq!(style.declarations.len(), 2);
        let border = style.get("border-top-color").unwrap();
        assert!(border.important);
        assert!(!style.get("color").unwrap().important);
    }

    #[test]
    fn style_attribute_keeps_authored_text() {
        let style = parse_style_attribute(
            r#"COLOR: RED; content: "a;b"; background-image: url("x;y.png"); bogus;"#,
        );
        assert_eq!(style.get("color").unwrap().value, "red");
        assert_eq!(style.get("color").unwrap().authored.as_deref(), Some("COLOR: RED"));
        assert_eq!(
            style.to_css_text(),
            r#"COLOR: RED; content: "a;b"; background-image: url("x;y.png");"#
        );
    }

    #[test]
    fn duplicate_declarations_in_style_attribute_collapse() {
        let style = parse_style_attribute("color: red !important; color: blue; margin: 0; margin: 1px");
        assert_eq!(style.declarations.len(), 2);
        assert_eq!(style.get("color").unwrap().value, "red");
        assert_eq!(style.get("margin").unwrap().value, "1px");
    }

    #[test]
    fn empty_style_attribute_is_empty() {
        assert!(parse_style_attribute("").is_empty());
    }
}
