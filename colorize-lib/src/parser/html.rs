//! This module contains functions and types for parsing HTML into the
//! `crate::dom::dom_tree` document and for writing that document back out.
//!
//! It uses html5ever as the HTML parser.

use crate::dom::dom_tree;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, NodeOrText, QuirksMode, TreeSink},
    LocalName, Namespace, QualName,
};
use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

/// A list of void (self-closing) elements in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "meta", "img", "br", "hr", "input", "link", "area", "base", "col", "embed", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is written out without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Creates a document from the provided HTML content.
///
/// Stylesheets from `<style>` elements are compiled before returning, so
/// computed styles are available straight away.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let tree_sink = ColorizeTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content.to_string())
}

/// Serializes the document (doctype included) back into HTML.
pub fn serialize_document(document: &dom_tree::Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = &*document.doctype.borrow() {
        let _ = write!(out, "<!DOCTYPE {}", doctype.name);
        if !doctype.public_id.is_empty() {
            let _ = write!(out, " PUBLIC \"{}\"", doctype.public_id);
            if !doctype.system_id.is_empty() {
                let _ = write!(out, " \"{}\"", doctype.system_id);
            }
        } else if !doctype.system_id.is_empty() {
            let _ = write!(out, " SYSTEM \"{}\"", doctype.system_id);
        }
        out.push('>');
    }
    serialize_node(&document.root.borrow(), false, &mut out);
    out
}

fn serialize_node(node: &dom_tree::Node, raw_text: bool, out: &mut String) {
    match node {
        dom_tree::Node::DocumentRoot(root) => {
            for child in &root.children {
                serialize_node(&child.borrow(), false, out);
            }
        }
        dom_tree::Node::Element(elem) => {
            let _ = write!(out, "<{}", elem.tag);
            for (k, v) in &elem.attributes {
                let _ = write!(out, " {}=\"{}\"", k, escape(v, true));
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&elem.tag.as_str());
            for child in &elem.children {
                serialize_node(&child.borrow(), raw, out);
            }
            let _ = write!(out, "</{}>", elem.tag);
        }
        dom_tree::Node::Text(text) => {
            if raw_text {
                out.push_str(&text.text);
            } else {
                out.push_str(&escape(&text.text, false));
            }
        }
        dom_tree::Node::Comment(comment) => {
            let _ = write!(out, "<!--{}-->", comment.text);
        }
    }
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            '<' if !in_attribute => escaped.push_str("&lt;"),
            '>' if !in_attribute => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Attribute name as written in markup, keeping a namespace prefix such as `xlink:`.
fn attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

fn text_node(text: &str) -> dom_tree::NodeRef {
    Rc::new(RefCell::new(dom_tree::Node::new_text(text)))
}

/// A custom TreeSink for building the document used by the engine.
pub struct ColorizeTreeSink {
    document: dom_tree::Document,
}

impl ColorizeTreeSink {
    /// Creates a new `ColorizeTreeSink` with an empty document.
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
        }
    }
}

impl Default for ColorizeTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

/// A simple implementation of the `ElemName` trait for our elements.
#[derive(Debug)]
pub struct ColorizeElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for ColorizeElemName {
    /// Returns a reference to the local name of the element.
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    /// Returns a reference to the namespace of the element.
    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for ColorizeTreeSink {
    type Handle = dom_tree::NodeRef;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = ColorizeElemName
    where
        Self: 'a;

    /// Finalizes the Document and compiles its stylesheets.
    fn finish(self) -> Self::Output {
        self.document.refresh_stylesheets();
        self.document
    }

    /// Called when a parsing error occurs; real pages are full of them.
    fn parse_error(&self, msg: std::borrow::Cow<'static, str>) {
        log::debug!("html parse error: {}", msg);
    }

    /// Returns the handle to the document's root node.
    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    /// Returns the element name for the given element handle.
    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        if let dom_tree::Node::Element(ref elem) = *target.borrow() {
            ColorizeElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            }
        } else {
            panic!("elem_name called on non-element node")
        }
    }

    /// Creates a new element node with the given name and attributes.
    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: html5ever::interface::ElementFlags,
    ) -> Self::Handle {
        let attributes = attrs
            .into_iter()
            .map(|attr| (attribute_name(&attr.name), attr.value.to_string()))
            .collect::<Vec<_>>();
        let element_node = dom_tree::ElementNode::with_attributes(name, attributes);
        Rc::new(RefCell::new(dom_tree::Node::Element(element_node)))
    }

    /// Creates a comment node; kept so the page serializes back unchanged.
    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Rc::new(RefCell::new(dom_tree::Node::new_comment(text.to_string())))
    }

    /// Processing instructions only exist in XML; HTML writes them out as bogus comments.
    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        let text = format!("?{} {}", target, data);
        Rc::new(RefCell::new(dom_tree::Node::new_comment(text)))
    }

    /// Appends a child node or text to the given parent node.
    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let child_node = match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => text_node(&text),
        };
        dom_tree::attach(parent, child_node, None);
    }

    /// Appends before `element` when it has a parent, otherwise under `prev_element`.
    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if dom_tree::parent_of(element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    /// Appends the DOCTYPE information to the Document.
    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    /// Returns the contents of a template element.
    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    /// Determines if two node handles refer to the same node.
    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    /// Quirks mode does not change how colors cascade, so it is only logged.
    fn set_quirks_mode(&self, mode: QuirksMode) {
        log::debug!("document quirks mode: {:?}", mode);
    }

    /// Inserts a node right before `sibling` (foster parenting).
    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let Some(parent) = dom_tree::parent_of(sibling) else {
            return;
        };
        let child_node = match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => text_node(&text),
        };
        dom_tree::attach(&parent, child_node, Some(sibling));
    }

    /// Adds attributes to the target node if they are missing.
    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        let mut target_node = target.borrow_mut();

        if let dom_tree::Node::Element(elem_node) = &mut *target_node {
            for attr in attrs {
                let key = attribute_name(&attr.name);
                if elem_node.attribute(&key).is_none() {
                    elem_node.set_attribute(&key, &attr.value);
                }
            }
        }
    }

    /// Removes a node from its parent.
    fn remove_from_parent(&self, target: &Self::Handle) {
        dom_tree::detach(target);
    }

    /// Moves every child of `node` under `new_parent`.
    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = node.borrow().children().to_vec();
        for child in children {
            dom_tree::attach(new_parent, child, None);
        }
    }
}
