//! services/viewer/src/adapters/html.rs
//!
//! Best-effort plain-text extraction from HTML using `html5ever`.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::collapse_whitespace;

/// Elements whose contents are never visible text.
const SKIPPED: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that end a run of text; a separator is emitted after them.
const BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6",
    "section", "article", "header", "footer", "blockquote", "pre", "table", "ul", "ol",
];

/// Returns the visible text of the document body with whitespace collapsed.
/// Never fails: malformed markup is repaired by the parser.
pub fn extract_body_text(markup: &str) -> String {
    let dom = parse_document(RcDom::default(), Default::default()).one(markup);
    let root = find_element(&dom.document, "body").unwrap_or_else(|| dom.document.clone());

    let mut text = String::new();
    collect_text(&root, &mut text);
    collapse_whitespace(&text)
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == tag {
            return Some(node.clone());
        }
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

fn collect_text(node: &Handle, out: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => out.push_str(&contents.borrow()),
        NodeData::Element { ref name, .. } => {
            let tag: &str = &name.local;
            if SKIPPED.contains(&tag) {
                return;
            }
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
            if BLOCKS.contains(&tag) {
                out.push(' ');
            }
        }
        NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_text_is_extracted() {
        let html = "<html><head><title>T</title></head><body><p>Hello</p></body></html>";
        assert_eq!(extract_body_text(html), "Hello");
    }

    #[test]
    fn scripts_and_styles_are_skipped() {
        let html = "<body><style>p{}</style><p>One</p><script>var x = 1;</script><p>Two</p></body>";
        assert_eq!(extract_body_text(html), "One Two");
    }

    #[test]
    fn whitespace_is_collapsed() {
        let html = "<div>\n   spread \n\n  out\t text </div>";
        assert_eq!(extract_body_text(html), "spread out text");
    }

    #[test]
    fn malformed_or_empty_input_never_fails() {
        assert_eq!(extract_body_text(""), "");
        assert_eq!(extract_body_text("<p>unclosed <b>bold"), "unclosed bold");
        assert_eq!(extract_body_text("plain words"), "plain words");
    }
}
