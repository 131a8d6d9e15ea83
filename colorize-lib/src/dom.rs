use html5ever::{LocalName, QualName};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::style::computed::{self, ComputedStyle};
use crate::style::css_matcher::{self, CssRule};
use crate::style::owned_css::{InlineStyle, OwnedStylesheet};
use crate::style::stylesheet;

pub mod dom_tree {
    use super::*;
    use html5ever::namespace_url;
    use html5ever::ns;

    pub type NodeRef = Rc<RefCell<Node>>;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(TextNode),
        Comment(CommentNode),
    }

    /// Character data; merged with an adjacent text sibling on insertion.
    #[derive(Debug, Clone)]
    pub struct TextNode {
        pub text: String,
        pub parent: Option<Weak<RefCell<Node>>>,
    }

    #[derive(Debug, Clone)]
    pub struct CommentNode {
        pub text: String,
        pub parent: Option<Weak<RefCell<Node>>>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct DocumentRootNode {
        pub children: Vec<NodeRef>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        pub attributes: Vec<(String, String)>,
        /// Parsed form of the `style` attribute; kept in sync with it.
        pub inline_style: InlineStyle,
        pub children: Vec<NodeRef>,
        pub parent: Option<Weak<RefCell<Node>>>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl DocumentRootNode {
        pub fn new() -> Self {
            DocumentRootNode {
                children: Vec::new(),
            }
        }
    }

    impl Node {
        pub fn as_element(&self) -> Option<&ElementNode> {
            match self {
                Node::Element(elem) => Some(elem),
                _ => None,
            }
        }

        pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
            match self {
                Node::Element(elem) => Some(elem),
                _ => None,
            }
        }

        pub fn is_element(&self) -> bool {
            matches!(self, Node::Element(_))
        }

        pub fn can_have_children(&self) -> bool {
            matches!(self, Node::DocumentRoot(_) | Node::Element(_))
        }

        pub fn new_text(text: impl Into<String>) -> Self {
            Node::Text(TextNode {
                text: text.into(),
                parent: None,
            })
        }

        pub fn new_comment(text: impl Into<String>) -> Self {
            Node::Comment(CommentNode {
                text: text.into(),
                parent: None,
            })
        }

        pub fn children(&self) -> &[NodeRef] {
            match self {
                Node::DocumentRoot(root) => &root.children,
                Node::Element(elem) => &elem.children,
                Node::Text(_) | Node::Comment(_) => &[],
            }
        }

        fn children_mut(&mut self) -> Option<&mut Vec<NodeRef>> {
            match self {
                Node::DocumentRoot(root) => Some(&mut root.children),
                Node::Element(elem) => Some(&mut elem.children),
                Node::Text(_) | Node::Comment(_) => None,
            }
        }

        fn parent_link(&self) -> Option<&Weak<RefCell<Node>>> {
            match self {
                Node::DocumentRoot(_) => None,
                Node::Element(elem) => elem.parent.as_ref(),
                Node::Text(text) => text.parent.as_ref(),
                Node::Comment(comment) => comment.parent.as_ref(),
            }
        }

        fn set_parent_link(&mut self, parent: Option<Weak<RefCell<Node>>>) {
            match self {
                Node::DocumentRoot(_) => {}
                Node::Element(elem) => elem.parent = parent,
                Node::Text(text) => text.parent = parent,
                Node::Comment(comment) => comment.parent = parent,
            }
        }
    }

    impl ElementNode {
        pub fn new(tag: String, qual_name: QualName) -> Self {
            ElementNode {
                tag,
                qual_name,
                attributes: Vec::new(),
                inline_style: InlineStyle::new(),
                children: Vec::new(),
                parent: None,
            }
        }

        /// Builds an element from parsed attributes, parsing `style` if present.
        pub fn with_attributes(qual_name: QualName, attributes: Vec<(String, String)>) -> Self {
            let mut elem = ElementNode::new(qual_name.local.to_string(), qual_name);
            for (name, value) in attributes {
                elem.set_attribute(&name, &value);
            }
            elem
        }

        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn has_class(&self, class_name: &str) -> bool {
            self.attribute("class")
                .map(|classes| classes.split_whitespace().any(|c| c == class_name))
                .unwrap_or(false)
        }

        pub fn is_svg(&self) -> bool {
            self.qual_name.ns == ns!(svg)
        }

        /// Sets an attribute; setting `style` re-parses the inline declarations.
        pub fn set_attribute(&mut self, name: &str, value: &str) {
            match self
                .attributes
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
            {
                Some(existing) => existing.1 = value.to_string(),
                None => self.attributes.push((name.to_string(), value.to_string())),
            }
            if name.eq_ignore_ascii_case("style") {
                self.inline_style = stylesheet::parse_style_attribute(value);
            }
        }

        /// Writes the inline style back into the `style` attribute without re-parsing.
        fn sync_style_attribute(&mut self) {
            let css_text = self.inline_style.to_css_text();
            match self
                .attributes
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case("style"))
            {
                Some(existing) => existing.1 = css_text,
                None => self.attributes.push(("style".to_string(), css_text)),
            }
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::new()))),
            doctype: RefCell::new(None),
            rules: RefCell::new(Vec::new()),
            extra_sheets: RefCell::new(Vec::new()),
            observer: RefCell::new(None),
        }
    }

    /// Parent of `node`, if it is attached somewhere.
    pub fn parent_of(node: &NodeRef) -> Option<NodeRef> {
        node.borrow().parent_link().and_then(Weak::upgrade)
    }

    /// Parent of `node` if that parent is itself an element.
    pub fn parent_element(node: &NodeRef) -> Option<NodeRef> {
        parent_of(node).filter(|parent| parent.borrow().is_element())
    }

    /// True if `node` is `ancestor` or sits somewhere below it.
    pub fn is_inclusive_descendant(node: &NodeRef, ancestor: &NodeRef) -> bool {
        let mut current = Some(Rc::clone(node));
        while let Some(candidate) = current {
            if Rc::ptr_eq(&candidate, ancestor) {
                return true;
            }
            current = parent_of(&candidate);
        }
        false
    }

    /// Element siblings before `node`, nearest first.
    pub fn previous_element_siblings(node: &NodeRef) -> Vec<NodeRef> {
        let Some(parent) = parent_of(node) else {
            return Vec::new();
        };
        let parent = parent.borrow();
        let children = parent.children();
        let Some(index) = children.iter().position(|c| Rc::ptr_eq(c, node)) else {
            return Vec::new();
        };
        let siblings: Vec<NodeRef> = children[..index]
            .iter()
            .rev()
            .filter(|c| c.borrow().is_element())
            .cloned()
            .collect();
        siblings
    }

    /// Pre-order list of the nodes below `node`, not including `node` itself.
    pub fn descendants(node: &NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        collect_descendants(node, &mut out);
        out
    }

    fn collect_descendants(node: &NodeRef, out: &mut Vec<NodeRef>) {
        for child in node.borrow().children() {
            out.push(Rc::clone(child));
            collect_descendants(child, out);
        }
    }

    /// Detach `child` from wherever it currently is.
    pub fn detach(child: &NodeRef) {
        if let Some(old_parent) = parent_of(child) {
            if let Some(children) = old_parent.borrow_mut().children_mut() {
                children.retain(|c| !Rc::ptr_eq(c, child));
            }
        }
        child.borrow_mut().set_parent_link(None);
    }

    /// Insert `child` under `parent`, before `reference` when given, else at the end.
    /// Adjacent text is merged the way the HTML parser expects.
    ///
    /// Returns false, leaving the tree untouched, when `parent` cannot hold
    /// children or when `child` is `parent` or one of its ancestors.
    pub fn attach(parent: &NodeRef, child: NodeRef, reference: Option<&NodeRef>) -> bool {
        if !parent.borrow().can_have_children() {
            return false;
        }
        if is_inclusive_descendant(parent, &child) {
            log::debug!("refusing to insert a node into its own subtree");
            return false;
        }
        detach(&child);

        let mut parent_borrow = parent.borrow_mut();
        let Some(children) = parent_borrow.children_mut() else {
            return false;
        };
        let index = reference
            .and_then(|r| children.iter().position(|c| Rc::ptr_eq(c, r)))
            .unwrap_or(children.len());

        let appended_text = match &*child.borrow() {
            Node::Text(text) => Some(text.text.clone()),
            _ => None,
        };
        if let (Some(text), Some(previous)) = (&appended_text, index.checked_sub(1)) {
            if let Node::Text(existing) = &mut *children[previous].borrow_mut() {
                existing.text.push_str(text);
                return true;
            }
        }
        child.borrow_mut().set_parent_link(Some(Rc::downgrade(parent)));
        children.insert(index, child);
        true
    }

    /// Text content of `node` and everything below it.
    pub fn text_content(node: &NodeRef) -> String {
        let mut out = String::new();
        match &*node.borrow() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Comment(_) => {}
            other => {
                for child in other.children() {
                    out.push_str(&text_content(child));
                }
            }
        }
        out
    }

    /// A single mutation notification.
    #[derive(Debug, Clone)]
    pub enum MutationRecord {
        /// Nodes were added under `target`.
        ChildList {
            target: NodeRef,
            added: Vec<NodeRef>,
        },
        /// Attribute `name` of `target` changed.
        Attributes { target: NodeRef, name: String },
    }

    /// What an observer wants to hear about.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ObserveOptions {
        pub child_list: bool,
        pub attributes: bool,
        pub subtree: bool,
        /// Attribute names of interest; empty means every attribute.
        pub attribute_filter: Vec<String>,
    }

    #[derive(Debug)]
    pub(crate) struct Registration {
        target: NodeRef,
        options: ObserveOptions,
        records: Vec<MutationRecord>,
    }

    impl Registration {
        fn in_scope(&self, node: &NodeRef) -> bool {
            if self.options.subtree {
                is_inclusive_descendant(node, &self.target)
            } else {
                Rc::ptr_eq(node, &self.target)
            }
        }

        fn wants(&self, record: &MutationRecord) -> bool {
            match record {
                MutationRecord::ChildList { target, .. } => {
                    self.options.child_list && self.in_scope(target)
                }
                MutationRecord::Attributes { target, name } => {
                    self.options.attributes
                        && (self.options.attribute_filter.is_empty()
                            || self
                                .options
                                .attribute_filter
                                .iter()
                                .any(|f| f.eq_ignore_ascii_case(name)))
                        && self.in_scope(target)
                }
            }
        }
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: NodeRef,
        pub doctype: RefCell<Option<Doctype>>,
        /// Compiled rules of every `<style>` element followed by the extra sheets.
        pub(crate) rules: RefCell<Vec<CssRule>>,
        pub(crate) extra_sheets: RefCell<Vec<OwnedStylesheet>>,
        pub(crate) observer: RefCell<Option<Registration>>,
    }

    impl Document {
        pub fn create_element(&self, tag: &str) -> NodeRef {
            let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
            Rc::new(RefCell::new(Node::Element(ElementNode::new(
                tag.to_string(),
                qual_name,
            ))))
        }

        pub fn create_text(&self, text: &str) -> NodeRef {
            Rc::new(RefCell::new(Node::new_text(text)))
        }

        pub fn body(&self) -> Option<NodeRef> {
            self.elements()
                .into_iter()
                .find(|node| matches!(node.borrow().as_element(), Some(e) if e.tag == "body"))
        }

        /// Every element in document order (a static snapshot, like `querySelectorAll('*')`).
        pub fn elements(&self) -> Vec<NodeRef> {
            descendants(&self.root)
                .into_iter()
                .filter(|node| node.borrow().is_element())
                .collect()
        }

        pub fn descendants(&self, node: &NodeRef) -> Vec<NodeRef> {
            descendants(node)
        }

        /// DOM `appendChild`. Inserting a node into its own subtree is a no-op.
        pub fn append_child(&self, parent: &NodeRef, child: &NodeRef) {
            if !attach(parent, Rc::clone(child), None) {
                return;
            }
            let touches_styles = contains_style_element(child) || is_style_element(parent);
            self.queue_record(MutationRecord::ChildList {
                target: Rc::clone(parent),
                added: vec![Rc::clone(child)],
            });
            if touches_styles {
                self.refresh_stylesheets();
            }
        }

        pub fn attribute(&self, node: &NodeRef, name: &str) -> Option<String> {
            node.borrow()
                .as_element()
                .and_then(|elem| elem.attribute(name))
                .map(str::to_string)
        }

        pub fn set_attribute(&self, node: &NodeRef, name: &str, value: &str) {
            match node.borrow_mut().as_element_mut() {
                Some(elem) => elem.set_attribute(name, value),
                None => return,
            }
            self.queue_record(MutationRecord::Attributes {
                target: Rc::clone(node),
                name: name.to_string(),
            });
        }

        pub fn inline_style(&self, node: &NodeRef) -> Option<InlineStyle> {
            node.borrow()
                .as_element()
                .map(|elem| elem.inline_style.clone())
        }

        /// CSSOM `style.setProperty(property, value, priority)`.
        ///
        /// Returns whether the serialized declaration block changed; an
        /// unchanged block queues no mutation record.
        pub fn set_style_property(
            &self,
            node: &NodeRef,
            property: &str,
            value: &str,
            important: bool,
        ) -> bool {
            {
                let mut node_borrow = node.borrow_mut();
                let Some(elem) = node_borrow.as_element_mut() else {
                    return false;
                };
                let before = elem.inline_style.to_css_text();
                elem.inline_style.set_property(property, value, important);
                if elem.inline_style.to_css_text() == before {
                    return false;
                }
                elem.sync_style_attribute();
            }
            self.queue_record(MutationRecord::Attributes {
                target: Rc::clone(node),
                name: "style".to_string(),
            });
            true
        }

        pub fn computed_style(&self, node: &NodeRef) -> Option<ComputedStyle> {
            computed::compute_style(self, node)
        }

        /// Adds a stylesheet that cascades after the document's own `<style>` elements.
        pub fn add_stylesheet(&self, css_text: &str) -> Result<(), crate::error::ColorizeError> {
            let sheet = stylesheet::parse_stylesheet(css_text)?;
            self.extra_sheets.borrow_mut().push(sheet);
            self.refresh_stylesheets();
            Ok(())
        }

        /// Recompile the cascade from the current `<style>` elements and extra sheets.
        pub fn refresh_stylesheets(&self) {
            let mut sheets = Vec::new();
            for node in self.elements() {
                if !is_style_element(&node) {
                    continue;
                }
                match stylesheet::parse_stylesheet(&text_content(&node)) {
                    Ok(sheet) => sheets.push(sheet),
                    Err(e) => log::warn!("skipping <style> element: {}", e),
                }
            }
            sheets.extend(self.extra_sheets.borrow().iter().cloned());

            let mut source_order = 0;
            let rules = sheets
                .iter()
                .flat_map(|sheet| css_matcher::compile_rules(sheet, &mut source_order))
                .collect::<Vec<_>>();
            log::debug!("compiled {} style rules from {} sheets", rules.len(), sheets.len());
            *self.rules.borrow_mut() = rules;
        }

        /// Register the (single) mutation observer, replacing any previous one.
        pub fn observe(&self, target: &NodeRef, options: ObserveOptions) {
            *self.observer.borrow_mut() = Some(Registration {
                target: Rc::clone(target),
                options,
                records: Vec::new(),
            });
        }

        /// Drain the records queued since the last call.
        pub fn take_records(&self) -> Vec<MutationRecord> {
            self.observer
                .borrow_mut()
                .as_mut()
                .map(|registration| std::mem::take(&mut registration.records))
                .unwrap_or_default()
        }

        pub fn disconnect(&self) {
            *self.observer.borrow_mut() = None;
        }

        pub fn is_observed(&self) -> bool {
            self.observer.borrow().is_some()
        }

        fn queue_record(&self, record: MutationRecord) {
            if let Some(registration) = self.observer.borrow_mut().as_mut() {
                if registration.wants(&record) {
                    registration.records.push(record);
                }
            }
        }
    }

    fn is_style_element(node: &NodeRef) -> bool {
        matches!(node.borrow().as_element(), Some(e) if e.tag.eq_ignore_ascii_case("style"))
    }

    fn contains_style_element(node: &NodeRef) -> bool {
        is_style_element(node) || descendants(node).iter().any(is_style_element)
    }
}

#[cfg(test)]
mod tests {
    use super::dom_tree::*;
    use std::rc::Rc;

    fn document_with_body() -> (Document, NodeRef) {
        let doc = new_document();
        let html = doc.create_element("html");
        let body = doc.create_element("body");
        doc.append_child(&doc.root, &html);
        doc.append_child(&html, &body);
        (doc, body)
    }

    #[test]
    fn append_child_sets_parent_and_order() {
        let (doc, body) = document_with_body();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(&body, &a);
        doc.append_child(&body, &b);

        assert!(Rc::ptr_eq(&parent_of(&a).unwrap(), &body));
        let tags: Vec<String> = doc
            .elements()
            .iter()
            .map(|n| n.borrow().as_element().unwrap().tag.clone())
            .collect();
        assert_eq!(tags, vec!["html", "body", "a", "b"]);
        assert_eq!(previous_element_siblings(&b).len(), 1);
    }

    #[test]
    fn records_only_while_observed_and_in_scope() {
        let (doc, body) = document_with_body();
        let outside = doc.create_element("head");
        let html = parent_of(&body).unwrap();

        doc.append_child(&body, &doc.create_element("p"));
        assert!(doc.take_records().is_empty());

        doc.observe(
            &body,
            ObserveOptions {
                child_list: true,
                attributes: true,
                subtree: true,
                attribute_filter: vec!["style".into(), "class".into()],
            },
        );
        doc.append_child(&html, &outside);
        let span = doc.create_element("span");
        doc.append_child(&body, &span);
        doc.set_attribute(&span, "title", "ignored");
        doc.set_attribute(&span, "class", "x");

        let records = doc.take_records();
        assert_eq!(records.len(), 2);
        assert!(matches!(&records[0], MutationRecord::ChildList { added, .. } if Rc::ptr_eq(&added[0], &span)));
        assert!(matches!(&records[1], MutationRecord::Attributes { name, .. } if name == "class"));
        assert!(doc.take_records().is_empty());

        doc.disconnect();
        doc.set_attribute(&span, "class", "y");
        assert!(doc.take_records().is_empty());
    }

    #[test]
    fn set_style_property_is_quiet_when_unchanged() {
        let (doc, body) = document_with_body();
        doc.observe(
            &body,
            ObserveOptions {
                attributes: true,
                ..ObserveOptions::default()
            },
        );
        assert!(doc.set_style_property(&body, "color", "red", true));
        assert!(!doc.set_style_property(&body, "color", "red", true));
        assert_eq!(doc.take_records().len(), 1);
        assert_eq!(
            doc.attribute(&body, "style").as_deref(),
            Some("color: red !important;")
        );
    }

    #[test]
    fn style_attribute_round_trips_into_inline_style() {
        let (doc, body) = document_with_body();
        doc.set_attribute(&body, "style", "color: blue");
        let style = doc.inline_style(&body).unwrap();
        assert_eq!(style.declarations.len(), 1);
        assert_eq!(style.declarations[0].property, "color");
    }

    #[test]
    fn appending_style_element_recompiles_rules() {
        let (doc, body) = document_with_body();
        let style = doc.create_element("style");
        let text = doc.create_text("p { color: red }");
        doc.append_child(&style, &text);
        doc.append_child(&body, &style);
        assert_eq!(doc.rules.borrow().len(), 1);
    }

    #[test]
    fn adjacent_text_is_merged() {
        let doc = new_document();
        let p = doc.create_element("p");
        attach(&p, doc.create_text("a"), None);
        attach(&p, doc.create_text("b"), None);
        assert_eq!(p.borrow().children().len(), 1);
        assert_eq!(text_content(&p), "ab");
    }

    #[test]
    fn moving_text_removes_it_from_the_old_parent() {
        let doc = new_document();
        let from = doc.create_element("p");
        let to = doc.create_element("b");
        let text = doc.create_text("2");
        attach(&from, Rc::clone(&text), None);
        assert!(Rc::ptr_eq(&parent_of(&text).unwrap(), &from));

        attach(&to, Rc::clone(&text), None);
        assert!(from.borrow().children().is_empty());
        assert_eq!(text_content(&to), "2");
        assert!(Rc::ptr_eq(&parent_of(&text).unwrap(), &to));
    }

    #[test]
    fn appending_an_ancestor_under_its_descendant_is_ignored() {
        let (doc, body) = document_with_body();
        let div = doc.create_element("div");
        let p = doc.create_element("p");
        doc.append_child(&body, &div);
        doc.append_child(&div, &p);
        doc.observe(
            &body,
            ObserveOptions {
                child_list: true,
                subtree: true,
                ..ObserveOptions::default()
            },
        );

        doc.append_child(&p, &div);
        doc.append_child(&p, &p);

        assert!(Rc::ptr_eq(&parent_of(&div).unwrap(), &body));
        assert!(p.borrow().children().is_empty());
        assert_eq!(doc.elements().len(), 4);
        assert!(doc.take_records().is_empty());
    }

    #[test]
    fn comments_have_parents_but_no_text_content() {
        let doc = new_document();
        let p = doc.create_element("p");
        let comment = Rc::new(std::cell::RefCell::new(Node::new_comment(" note ")));
        attach(&p, Rc::clone(&comment), None);
        attach(&p, doc.create_text("x"), None);
        assert!(Rc::ptr_eq(&parent_of(&comment).unwrap(), &p));
        assert_eq!(text_content(&p), "x");
    }
}
