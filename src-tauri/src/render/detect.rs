//! Language guessing for fenced code blocks without a language tag.
//!
//! OCR output of screenshots is mostly JSON, shell sessions, Python,
//! JavaScript, Rust or HTML. Each candidate language has a handful of line
//! indicators; the language with the most matching indicators wins, and at
//! least two must match. Returned names are syntect tokens.

type Indicator = fn(&str) -> bool;

const PYTHON: &[Indicator] = &[
    |l| l.starts_with("def ") && l.ends_with(':'),
    |l| l.starts_with("import ") || (l.starts_with("from ") && l.contains(" import ")),
    |l| l.starts_with("class ") && l.ends_with(':'),
    |l| l.starts_with("print(") || l.starts_with("self."),
    |l| l.starts_with("if ") && l.ends_with(':'),
];

const RUST: &[Indicator] = &[
    |l| l.starts_with("fn ") || l.starts_with("pub fn ") || l.starts_with("async fn "),
    |l| l.starts_with("let mut ") || (l.starts_with("use ") && l.contains("::")),
    |l| l.starts_with("impl ") || l.starts_with("struct ") || l.starts_with("enum "),
    |l| l.contains("->") && l.ends_with('{'),
    |l| l.contains("println!") || l.contains(".unwrap()"),
];

const JAVASCRIPT: &[Indicator] = &[
    |l| l.starts_with("const ") || l.starts_with("let ") || l.starts_with("var "),
    |l| l.starts_with("function ") || l.contains("=> {"),
    |l| l.contains("console.log(") || l.contains("document."),
    |l| l.starts_with("import ") && l.contains(" from "),
    |l| l.contains("await ") && l.ends_with(';'),
];

const SHELL: &[Indicator] = &[
    |l| l.starts_with("#!/bin/") || l.starts_with("#!/usr/bin/env "),
    |l| l.starts_with("$ ") || l.starts_with("sudo "),
    |l| l.starts_with("export ") && l.contains('='),
    |l| l.starts_with("echo ") || l.starts_with("cd ") || l.starts_with("ls"),
    |l| l.contains(" | grep ") || l.contains(" && "),
];

const HTML: &[Indicator] = &[
    |l| l.starts_with("<!DOCTYPE") || l.starts_with("<html"),
    |l| l.starts_with("<div") || l.starts_with("</div>"),
    |l| l.starts_with("<p>") || l.starts_with("<span"),
    |l| l.starts_with("<script") || l.starts_with("<style"),
    |l| l.starts_with("<a ") && l.contains("href="),
];

const LANGUAGES: &[(&str, &[Indicator])] = &[
    ("py", PYTHON),
    ("rs", RUST),
    ("js", JAVASCRIPT),
    ("sh", SHELL),
    ("html", HTML),
];

/// Guess a syntect token for an untagged code block.
pub fn detect_language(code: &str) -> Option<&'static str> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return None;
    }

    // JSON is cheap to confirm exactly.
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Some("json");
    }

    let lines: Vec<&str> = code
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    LANGUAGES
        .iter()
        .map(|(token, indicators)| {
            let hits = indicators
                .iter()
                .filter(|check| lines.iter().any(|&l| check(l)))
                .count();
            (*token, hits)
        })
        .filter(|(_, hits)| *hits >= 2)
        .max_by_key(|(_, hits)| *hits)
        .map(|(token, _)| token)
}
