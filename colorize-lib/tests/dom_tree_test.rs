use colorize_lib::dom::dom_tree;
use colorize_lib::parser::html::create_dom_tree;

#[cfg(test)]
pub mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect_structure(node: &dom_tree::NodeRef) -> String {
        let mut output = String::new();
        traverse_node(node, 0, &mut output);
        output
    }

    fn traverse_node(node: &dom_tree::NodeRef, depth: usize, output: &mut String) {
        let node_ref = node.borrow();
        match &*node_ref {
            dom_tree::Node::DocumentRoot(root_node) => {
                for child in &root_node.children {
                    traverse_node(child, depth, output);
                }
            }
            dom_tree::Node::Element(elem_node) => {
                *output += &format!("{}<{}>\n", "  ".repeat(depth), elem_node.tag);
                for child in &elem_node.children {
                    traverse_node(child, depth + 1, output);
                }
            }
            dom_tree::Node::Text(text) => {
                let trimmed = text.text.trim();
                if !trimmed.is_empty() {
                    *output += &format!("{}{}\n", "  ".repeat(depth), trimmed);
                }
            }
            dom_tree::Node::Comment(_) => {}
        }
    }

    fn find_tag(document: &dom_tree::Document, tag: &str) -> dom_tree::NodeRef {
        document
            .elements()
            .into_iter()
            .find(|n| n.borrow().as_element().map(|e| e.tag == tag).unwrap_or(false))
            .unwrap()
    }

    #[test]
    fn test_basic_structure() {
        let html = r#"
            <!DOCTYPE html>
            <html>
                <head>
                    <title>Test</title>
                </head>
                <body>
                    <h1>Hello</h1>
                    <p>World</p>
                </body>
            </html>
        "#;

        let document = create_dom_tree(html);
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
    <title>
      Test
  <body>
    <h1>
      Hello
    <p>
      World
"#;
        assert_eq!(structure.trim(), expected.trim());
        assert_eq!(document.doctype.borrow().as_ref().unwrap().name, "html");
    }

    #[test]
    fn test_attributes_and_inline_style() {
        let html = r#"
            <a href="https://example.com" style="color: #f8f7f6; margin: 0" data-test="123">
                Link
            </a>
        "#;

        let document = create_dom_tree(html);
        let a = find_tag(&document, "a");
        let a_ref = a.borrow();
        let elem = a_ref.as_element().unwrap();

        assert_eq!(
            elem.attributes,
            vec![
                ("href".to_string(), "https://example.com".to_string()),
                ("style".to_string(), "color: #f8f7f6; margin: 0".to_string()),
                ("data-test".to_string(), "123".to_string())
            ]
        );
        let color = elem.inline_style.get("color").unwrap();
        assert_eq!(color.value, "#f8f7f6");
        assert!(!color.important);
    }

    #[test]
    fn test_mixed_content() {
        let html = r#"
            <p>
                This is <strong>bold</strong> and <em>italic</em> text.
                <br>
                Next line.
            </p>
        "#;

        let document = create_dom_tree(html);
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
  <body>
    <p>
      This is
      <strong>
        bold
      and
      <em>
        italic
      text.
      <br>
      Next line.
"#;
        assert_eq!(structure.trim(), expected.trim());
    }

    #[test]
    fn test_table_autocorrection() {
        let html = "<table><td>Cell</td></table>";
        let document = create_dom_tree(html);

        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
  <body>
    <table>
      <tbody>
        <tr>
          <td>
            Cell
"#;
        assert_eq!(structure.trim(), expected.trim());
    }

    #[test]
    fn test_malformed_html() {
        let html = r#"
            <div>
                <p>Unclosed
                <img>
                </div>
        "#;

        let document = create_dom_tree(html);
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
  <body>
    <div>
      <p>
        Unclosed
        <img>
"#;
        assert_eq!(structure.trim(), expected.trim());
    }

    #[test]
    fn test_parent_links_are_set() {
        let document = create_dom_tree("<div><section><span>x</span></section></div>");
        let span = find_tag(&document, "span");
        let section = dom_tree::parent_element(&span).unwrap();
        assert_eq!(section.borrow().as_element().unwrap().tag, "section");
        assert!(dom_tree::is_inclusive_descendant(
            &span,
            &document.body().unwrap()
        ));
    }

    #[test]
    fn test_style_elements_feed_the_cascade() {
        let html = r#"
            <html><head><style>section > span { color: #fcfcfc }</style></head>
            <body><section><span>x</span></section><span>y</span></body></html>
        "#;
        let document = create_dom_tree(html);
        let spans: Vec<_> = document
            .elements()
            .into_iter()
            .filter(|n| n.borrow().as_element().unwrap().tag == "span")
            .collect();

        let inside = document.computed_style(&spans[0]).unwrap();
        let outside = document.computed_style(&spans[1]).unwrap();
        assert_eq!(inside.get("color"), Some("#fcfcfc"));
        assert_eq!(outside.get("color"), Some("rgb(0, 0, 0)"));
    }
}
