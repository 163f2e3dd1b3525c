//! HTML → visible text.
//!
//! Walks the parsed document and serializes text nodes, joined by single
//! spaces. Markup never counts as words.

use scraper::{ElementRef, Html, Node};

/// Tags whose subtrees carry no visible text
const SKIP_CHILDREN: &[&str] = &["script", "style", "noscript", "svg"];

/// Extract the visible text of an HTML document as one space-separated
/// string. Malformed markup is handled by the parser's error recovery.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut buf = String::new();
    collect_text(document.root_element(), &mut buf);
    buf
}

fn collect_text(el: ElementRef<'_>, buf: &mut String) {
    let tag = el.value().name.local.as_ref();
    if SKIP_CHILDREN.contains(&tag) {
        return;
    }
    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    collect_text(child_el, buf);
                }
            }
            Node::Text(t) => {
                let s = t.text.trim();
                if !s.is_empty() {
                    if !buf.is_empty() {
                        buf.push(' ');
                    }
                    buf.push_str(s);
                }
            }
            _ => {}
        }
    }
}
