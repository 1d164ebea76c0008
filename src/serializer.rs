//! Writes an element tree as (X)HTML text.

use crate::config::OutputFormat;
use crate::etree::Element;

const EMPTY_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "frame", "hr", "img", "input", "isindex", "link", "meta", "param",
];

fn is_empty_element(tag: &str) -> bool {
    EMPTY_ELEMENTS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn is_raw_text_element(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("style")
}

fn escape_cdata(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attrib(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Serializes `element` including its own tag and tail.
pub fn serialize_element(element: &Element, format: OutputFormat) -> String {
    let mut out = String::new();
    write_element(element, format, &mut out);
    out
}

/// Serializes the content of `root`: its text and children, but not the
/// root tag itself.
pub fn serialize_children(root: &Element, format: OutputFormat) -> String {
    let mut out = String::new();
    escape_cdata(&root.text, &mut out);
    for child in &root.children {
        write_element(child, format, &mut out);
    }
    out
}

enum Step<'a> {
    Open(&'a Element),
    Close(&'a Element),
}

fn write_element(element: &Element, format: OutputFormat, out: &mut String) {
    let mut stack = vec![Step::Open(element)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Open(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (key, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_attrib(value, out);
                    out.push('"');
                }
                let empty = is_empty_element(&el.tag);
                if empty && format == OutputFormat::Xhtml {
                    out.push_str(" />");
                    escape_cdata(&el.tail, out);
                    continue;
                }
                out.push('>');
                if is_raw_text_element(&el.tag) {
                    out.push_str(&el.text);
                } else {
                    escape_cdata(&el.text, out);
                }
                stack.push(Step::Close(el));
                for child in el.children.iter().rev() {
                    stack.push(Step::Open(child));
                }
            }
            Step::Close(el) => {
                if !is_empty_element(&el.tag) {
                    out.push_str("</");
                    out.push_str(&el.tag);
                    out.push('>');
                }
                escape_cdata(&el.tail, out);
            }
        }
    }
}
