use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::caption::unicode::{TextStyle, style_str};

/// Inherited formatting while walking the tree.
#[derive(Clone, Copy, Debug, Default)]
struct Inline {
    bold: bool,
    italic: bool,
}

impl Inline {
    fn style(self) -> TextStyle {
        TextStyle::from_flags(self.bold, self.italic)
    }
}

/// Convert a caption editor HTML fragment into styled plain Unicode text.
///
/// - `<b>`/`<strong>` and `<i>`/`<em>` select the bold, italic or bold-italic alphabet from the
///   combined ancestry, never by applying one map after the other.
/// - `<a href>` emits the bare URL instead of its label.
/// - `<br>` emits a newline; `<div>`/`<p>` boundaries emit at most one.
/// - Other elements are transparent containers.
///
/// The result is trimmed.
pub fn format_caption(html: &str) -> String {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let mut out = String::new();
    walk(&dom.document, Inline::default(), &mut out);
    out.trim().to_owned()
}

fn walk(handle: &Handle, inline: Inline, out: &mut String) {
    match &handle.data {
        NodeData::Document => walk_children(handle, inline, out),
        NodeData::Text { contents } => {
            let raw = contents.borrow();
            // Whitespace at the start of a line is source indentation, not content.
            let text: &str = if out.is_empty() || out.ends_with('\n') {
                raw.trim_start()
            } else {
                &raw
            };
            if !text.is_empty() {
                out.push_str(&style_str(text, inline.style()));
            }
        }
        NodeData::Element { name, attrs, .. } => match name.local.as_ref() {
            "b" | "strong" => walk_children(
                handle,
                Inline {
                    bold: true,
                    ..inline
                },
                out,
            ),
            "i" | "em" => walk_children(
                handle,
                Inline {
                    italic: true,
                    ..inline
                },
                out,
            ),
            "br" => out.push('\n'),
            "div" | "p" => {
                block_break(out);
                walk_children(handle, inline, out);
                block_break(out);
            }
            "a" => {
                let href = attrs
                    .borrow()
                    .iter()
                    .find(|a| a.name.local.as_ref() == "href")
                    .map(|a| a.value.trim().to_owned())
                    .filter(|h| !h.is_empty());
                match href {
                    Some(url) => out.push_str(&url),
                    None => walk_children(handle, inline, out),
                }
            }
            _ => walk_children(handle, inline, out),
        },
        _ => {}
    }
}

fn walk_children(handle: &Handle, inline: Inline, out: &mut String) {
    for child in handle.children.borrow().iter() {
        walk(child, inline, out);
    }
}

fn block_break(out: &mut String) {
    let kept = out.trim_end_matches([' ', '\t']).len();
    out.truncate(kept);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/format.rs"]
mod tests;
