//! Novel chapter markup.
//!
//! Creators write markdown; novel chapters are stored as HTML. [`render_novel`] goes one
//! way with `pulldown-cmark`. [`html_to_markdown`] goes back for editing: the stored HTML
//! is parsed with `scraper`, mapped onto markdown events and written out with
//! `pulldown-cmark-to-cmark`, so publishing an unchanged draft reproduces the stored HTML.
//!
//! | HTML | Markdown |
//! |------|----------|
//! | `p` | paragraph |
//! | `h1`..`h6` | heading |
//! | `ul`, `ol`, `li` | list, item |
//! | `em`/`i`, `strong`/`b` | `*emphasis*`, `**strong**` |
//! | `code`, `pre` | inline code, fenced block |
//! | `br` | line break |
//! | `hr` | rule |
//!
//! Any other element is unwrapped to its content.

use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use pulldown_cmark_to_cmark::cmark;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::error::{KonbiniError, Result};

type Events = Vec<Event<'static>>;

/// Renders a novel chapter body to HTML.
///
/// Single newlines become `<br />`, blank lines separate paragraphs. Raw HTML in the
/// body is escaped, never passed through.
pub fn render_novel(body: &str) -> String {
    let parser = Parser::new_ext(body, Options::empty()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(body.len() + body.len() / 4);
    html::push_html(&mut out, parser);
    out
}

/// Turns stored chapter HTML back into markdown for the editor.
pub fn html_to_markdown(content: &str) -> Result<String> {
    let fragment = Html::parse_fragment(content);
    let mut events = Events::new();
    blocks(fragment.root_element(), true, &mut events);

    let mut out = String::with_capacity(content.len());
    cmark(events.iter(), &mut out).map_err(|e| {
        KonbiniError::Validation(format!("chapter markup could not be converted: {:?}", e))
    })?;
    Ok(out.trim_matches('\n').to_string())
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "li" | "pre" | "hr"
            | "blockquote" | "div"
    )
}

fn heading_level(name: &str) -> Option<HeadingLevel> {
    Some(match name {
        "h1" => HeadingLevel::H1,
        "h2" => HeadingLevel::H2,
        "h3" => HeadingLevel::H3,
        "h4" => HeadingLevel::H4,
        "h5" => HeadingLevel::H5,
        "h6" => HeadingLevel::H6,
        _ => return None,
    })
}

/// Walks the children of a block container. Runs of inline content between blocks
/// become paragraphs when `loose`, and are emitted bare otherwise (tight list items).
fn blocks(parent: ElementRef<'_>, loose: bool, out: &mut Events) {
    let mut pending = Events::new();
    for child in parent.children() {
        match ElementRef::wrap(child) {
            Some(el) if is_block(el.value().name()) => {
                flush(&mut pending, loose, out);
                block(el, out);
            }
            Some(el) => inline(el, &mut pending),
            None => {
                if let Node::Text(text) = child.value() {
                    push_text(text, &mut pending);
                }
            }
        }
    }
    flush(&mut pending, loose, out);
}

fn flush(pending: &mut Events, loose: bool, out: &mut Events) {
    if pending.is_empty() {
        return;
    }
    if loose {
        out.push(Event::Start(Tag::Paragraph));
        out.append(pending);
        out.push(Event::End(TagEnd::Paragraph));
    } else {
        out.append(pending);
    }
}

fn block(el: ElementRef<'_>, out: &mut Events) {
    let name = el.value().name();
    if let Some(level) = heading_level(name) {
        out.push(Event::Start(Tag::Heading {
            level,
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
        }));
        inline_children(el, out);
        out.push(Event::End(TagEnd::Heading(level)));
        return;
    }

    match name {
        "p" => {
            out.push(Event::Start(Tag::Paragraph));
            inline_children(el, out);
            out.push(Event::End(TagEnd::Paragraph));
        }
        "ul" => {
            out.push(Event::Start(Tag::List(None)));
            items(el, out);
            out.push(Event::End(TagEnd::List(false)));
        }
        "ol" => {
            let start = el
                .value()
                .attr("start")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1);
            out.push(Event::Start(Tag::List(Some(start))));
            items(el, out);
            out.push(Event::End(TagEnd::List(true)));
        }
        "pre" => {
            let code: String = el.text().collect();
            out.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(
                CowStr::from(""),
            ))));
            out.push(Event::Text(code.into()));
            out.push(Event::End(TagEnd::CodeBlock));
        }
        "hr" => out.push(Event::Rule),
        _ => blocks(el, true, out),
    }
}

fn items(list: ElementRef<'_>, out: &mut Events) {
    for item in list.children().filter_map(ElementRef::wrap) {
        if item.value().name() != "li" {
            continue;
        }
        out.push(Event::Start(Tag::Item));
        blocks(item, false, out);
        out.push(Event::End(TagEnd::Item));
    }
}

fn inline_children(el: ElementRef<'_>, out: &mut Events) {
    for child in el.children() {
        match ElementRef::wrap(child) {
            Some(el) => inline(el, out),
            None => {
                if let Node::Text(text) = child.value() {
                    push_text(text, out);
                }
            }
        }
    }
}

fn inline(el: ElementRef<'_>, out: &mut Events) {
    match el.value().name() {
        "em" | "i" => {
            out.push(Event::Start(Tag::Emphasis));
            inline_children(el, out);
            out.push(Event::End(TagEnd::Emphasis));
        }
        "strong" | "b" => {
            out.push(Event::Start(Tag::Strong));
            inline_children(el, out);
            out.push(Event::End(TagEnd::Strong));
        }
        "code" => {
            let code: String = el.text().collect();
            out.push(Event::Code(code.into()));
        }
        "br" => out.push(Event::SoftBreak),
        _ => inline_children(el, out),
    }
}

/// Newlines in stored text only follow `<br />` or separate blocks.
fn push_text(text: &str, out: &mut Events) {
    let text: String = text.chars().filter(|c| *c != '\n').collect();
    if text.is_empty() || (out.is_empty() && text.trim().is_empty()) {
        return;
    }
    out.push(Event::Text(text.into()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn novel_keeps_line_breaks_and_escapes_html() {
        let html = render_novel("Dòng một\nDòng hai\n\nĐoạn <b>đậm</b> *nghiêng*");
        assert!(html.contains("Dòng một<br />"));
        assert!(html.contains("</p>\n<p>"));
        assert!(html.contains("&lt;b&gt;đậm&lt;/b&gt;"));
        assert!(html.contains("<em>nghiêng</em>"));
    }

    #[test]
    fn rendered_markup_survives_a_second_pass() {
        let body = "# Heading\n\nSome *italic* and **bold**\nnext line\n\n- one\n- two\n\n3. three\n4. four";
        let html = render_novel(body);
        assert!(html.contains("<h1>Heading</h1>"));
        assert!(html.contains("<ol start=\"3\">"));

        let markdown = html_to_markdown(&html).unwrap();
        assert_eq!(render_novel(&markdown), html);
    }

    #[test]
    fn breaks_and_entities_become_text() {
        let markdown = html_to_markdown("<p>a<br />\nb &amp; c</p>\n<p>d</p>\n").unwrap();
        assert_eq!(markdown, "a\nb & c\n\nd");
    }

    #[test]
    fn plain_text_and_unknown_tags_are_kept() {
        assert_eq!(html_to_markdown("Chỉ là chữ").unwrap(), "Chỉ là chữ");
        assert_eq!(
            html_to_markdown("<div><span>Xin</span> chào</div>").unwrap(),
            "Xin chào"
        );
        assert_eq!(html_to_markdown("").unwrap(), "");
    }

    #[test]
    fn escaped_markup_stays_escaped() {
        let html = render_novel("Đoạn <b>đậm</b> *nghiêng*");
        let markdown = html_to_markdown(&html).unwrap();
        assert_eq!(render_novel(&markdown), html);
    }
}
