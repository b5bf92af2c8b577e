//! Depth-first rendering of the content tree into one self-contained HTML
//! document. Image sources always point at extracted asset paths; bytes are
//! never inlined.

use crate::content::{ContentNode, ListItem};

const STYLESHEET: &str = "\
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; line-height: 1.5; color: #222; max-width: 46em; margin: 2em auto; padding: 0 1em; }
h1, h2, h3, h4, h5, h6 { line-height: 1.25; }
img { max-width: 100%; height: auto; }
table { border-collapse: collapse; margin: 1em 0; }
td { border: 1px solid #999; padding: 0.4em 0.6em; vertical-align: top; }
";

/// Renders a complete document: head with the default stylesheet, body from
/// the node sequence. The wrapper is always synthesized here, so the output
/// is never a fragment.
pub fn serialize(nodes: &[ContentNode], title: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
    push_escaped(&mut out, title);
    out.push_str("</title>\n<style>\n");
    out.push_str(STYLESHEET);
    out.push_str("</style>\n</head>\n<body>\n");
    render_nodes(&mut out, nodes);
    out.push_str("</body>\n</html>\n");
    out
}

fn render_nodes(out: &mut String, nodes: &[ContentNode]) {
    for node in nodes {
        render_node(out, node);
    }
}

fn render_node(out: &mut String, node: &ContentNode) {
    match node {
        ContentNode::Heading { level, text } => {
            out.push_str(&format!("<h{}>", level));
            push_escaped(out, text);
            out.push_str(&format!("</h{}>\n", level));
        }
        ContentNode::Paragraph(text) => {
            out.push_str("<p>");
            push_escaped(out, text);
            out.push_str("</p>\n");
        }
        ContentNode::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{}>\n", tag));
            for item in items {
                render_list_item(out, item);
            }
            out.push_str(&format!("</{}>\n", tag));
        }
        ContentNode::Table(rows) => {
            out.push_str("<table>\n");
            for row in rows {
                out.push_str("<tr>\n");
                for cell in row {
                    out.push_str("<td>");
                    render_nodes(out, cell);
                    out.push_str("</td>\n");
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</table>\n");
        }
        ContentNode::Image { src } => push_image(out, src),
    }
}

fn render_list_item(out: &mut String, item: &ListItem) {
    out.push_str("<li>");
    push_escaped(out, &item.text);
    for src in &item.images {
        push_image(out, src);
    }
    out.push_str("</li>\n");
}

fn push_image(out: &mut String, src: &str) {
    out.push_str("<img src=\"");
    push_escaped(out, src);
    out.push_str("\">\n");
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
