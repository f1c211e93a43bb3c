//! HTML flattening.
//!
//! The markup is parsed as a body fragment with `scraper` and its text nodes
//! are walked in document order. Block tags (`p`, `div`, `h1`..`h6`,
//! `blockquote`) leave a blank line after themselves and before themselves
//! when text precedes them; `<br>` is a single newline and `<li>` starts a
//! line. Runs of whitespace collapse to one space. Script and style bodies
//! are dropped.

use scraper::{ElementRef, Html, Node};

const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
];

pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    walk(fragment.root_element(), &mut out);
    out
}

fn walk(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(text, out),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    visit_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn visit_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    match name {
        "br" => out.push('\n'),
        "script" | "style" => {}
        "li" => {
            line_break(out);
            walk(element, out);
        }
        _ if BLOCK_TAGS.contains(&name) => {
            paragraph_break(out);
            walk(element, out);
            paragraph_break(out);
        }
        _ => walk(element, out),
    }
}

fn paragraph_break(out: &mut String) {
    if out.is_empty() {
        return;
    }
    let trailing = out.chars().rev().take_while(|c| *c == '\n').count();
    for _ in trailing..2 {
        out.push('\n');
    }
}

fn line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_text(raw: &str, out: &mut String) {
    for c in raw.chars() {
        if c.is_ascii_whitespace() {
            if out.is_empty() || out.ends_with(' ') || out.ends_with('\n') {
                continue;
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
}
