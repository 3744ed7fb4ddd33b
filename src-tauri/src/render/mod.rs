//! Result rendering — Markdown to HTML for the formatted tab, Markdown to
//! plain text for copying from it.
//!
//! Fenced code blocks are highlighted with syntect using CSS classes
//! (`ClassStyle::Spaced`), so the webview's stylesheet owns the colours.
//! Raw HTML in the reply is shown as text, never passed through: the output
//! is inserted into the page and the reply comes from a remote service.

mod detect;

pub use detect::detect_language;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render Markdown to HTML with highlighted fenced code blocks.
pub fn markdown_to_html(markdown: &str) -> String {
    let start = std::time::Instant::now();
    let mut events = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) if code.is_none() => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|s| s.to_string()),
                    CodeBlockKind::Indented => None,
                };
                code = Some((lang, String::new()));
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, buf)) = code.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => match code.take() {
                Some((lang, buf)) => {
                    let block = highlight_block(lang.as_deref(), &buf);
                    events.push(Event::Html(CowStr::from(block)));
                }
                None => events.push(Event::End(TagEnd::CodeBlock)),
            },
            Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
            event => events.push(event),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, events.into_iter());
    log::debug!(
        "[RENDER] {} chars of Markdown -> {} chars of HTML in {}ms",
        markdown.len(),
        out.len(),
        start.elapsed().as_millis()
    );
    out
}

/// Resolve a syntax from the fence tag, falling back to detection.
fn resolve_syntax<'a>(
    syntaxes: &'a SyntaxSet,
    lang: Option<&str>,
    code: &str,
) -> Option<&'a SyntaxReference> {
    lang.filter(|l| !l.is_empty())
        .and_then(|l| syntaxes.find_syntax_by_token(l))
        .or_else(|| syntaxes.find_syntax_by_first_line(code))
        .or_else(|| detect_language(code).and_then(|l| syntaxes.find_syntax_by_token(l)))
}

/// Highlight one code block into a `<pre><code>` element.
pub fn highlight_block(lang: Option<&str>, code: &str) -> String {
    let syntaxes = syntax_set();
    let Some(syntax) = resolve_syntax(syntaxes, lang, code) else {
        return format!("<pre><code>{}</code></pre>\n", escape_html(code));
    };

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, syntaxes, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            log::warn!("[RENDER] Highlighting failed for {}: {}", syntax.name, e);
            return format!("<pre><code>{}</code></pre>\n", escape_html(code));
        }
    }

    format!(
        "<pre class=\"code\" data-lang=\"{}\"><code>{}</code></pre>\n",
        escape_html(&syntax.name.to_lowercase()),
        generator.finalize()
    )
}

/// Flatten Markdown to the text a reader sees in the formatted view.
pub fn markdown_to_plain_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Text(text) | Event::Code(text) | Event::Html(text) | Event::InlineHtml(text) => {
                out.push_str(&text)
            }
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock | TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::TableCell) => out.push('\t'),
            Event::End(TagEnd::TableRow | TagEnd::TableHead) => {
                if out.ends_with('\t') {
                    out.pop();
                }
                out.push('\n');
            }
            _ => {}
        }
    }
    out.trim_end().to_string()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}
