use std::fmt;

// A fully-owned CSS stylesheet: a list of style rules only (@font-face, @keyframes etc. are dropped).
#[derive(Debug, Default, Clone)]
pub struct OwnedStylesheet {
    pub rules: Vec<OwnedRule>,
}

#[derive(Debug, Clone)]
pub struct OwnedRule {
    /// e.g. "div", ".red", "#header"
    pub selectors: Vec<String>,
    /// Normal and `!important` declarations, in source order.
    pub declarations: Vec<OwnedDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedDeclaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    /// The declaration exactly as written in a `style` attribute, if it came from one.
    pub authored: Option<String>,
}

impl OwnedDeclaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        OwnedDeclaration {
            property: property.into(),
            value: value.into(),
            important,
            authored: None,
        }
    }
}

impl fmt::Display for OwnedDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

impl fmt::Display for OwnedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Selectors: {:?}", self.selectors)?;
        for decl in &self.declarations {
            writeln!(f, "  {}", decl)?;
        }
        Ok(())
    }
}

/// The declaration block behind an element's `style` attribute.
///
/// Mirrors the CSSOM: `set_property` replaces an existing declaration in
/// place or appends a new one, and `to_css_text` is what gets written back
/// into the attribute. Declarations nobody has set keep their authored text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InlineStyle {
    pub declarations: Vec<OwnedDeclaration>,
}

impl InlineStyle {
    pub fn new() -> Self {
        InlineStyle::default()
    }

    pub fn get(&self, property: &str) -> Option<&OwnedDeclaration> {
        self.declarations
            .iter()
            .rev()
            .find(|decl| decl.property.eq_ignore_ascii_case(property))
    }

    pub fn set_property(&mut self, property: &str, value: &str, important: bool) {
        match self
            .declarations
            .iter_mut()
            .find(|decl| decl.property.eq_ignore_ascii_case(property))
        {
            Some(existing) => {
                existing.value = value.to_string();
                existing.important = important;
                existing.authored = None;
            }
            None => self
                .declarations
                .push(OwnedDeclaration::new(property, value, important)),
        }
    }

    /// Add a declaration read from an attribute. A later declaration of the
    /// same property replaces the earlier one unless only the earlier is `!important`.
    pub(crate) fn push_parsed(&mut self, declaration: OwnedDeclaration) {
        if let Some(index) = self
            .declarations
            .iter()
            .position(|decl| decl.property.eq_ignore_ascii_case(&declaration.property))
        {
            if self.declarations[index].important && !declaration.important {
                return;
            }
            self.declarations.remove(index);
        }
        self.declarations.push(declaration);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|decl| match &decl.authored {
                Some(text) => format!("{};", text),
                None => format!("{};", decl),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
