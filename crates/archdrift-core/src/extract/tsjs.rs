//! TS/JS import extraction: comment-stripping state machine plus
//! regex scan over import/export/require/dynamic-import forms.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use super::{dedupe_sorted, ImportSpec, LanguageExtractor};

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    SingleQuote,
    DoubleQuote,
    Template,
}

/// Strip `//` and `/* */` comments and blank out string/template literal
/// bodies (so specifier regexes never match text inside an unrelated
/// string), tracking backslash escapes within quotes.
pub fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut state = State::Code;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match state {
            State::Code => match (c, next) {
                ('/', Some('/')) => {
                    state = State::LineComment;
                    out.push(' ');
                    out.push(' ');
                    i += 2;
                    continue;
                }
                ('/', Some('*')) => {
                    state = State::BlockComment;
                    out.push(' ');
                    out.push(' ');
                    i += 2;
                    continue;
                }
                ('\'', _) => {
                    state = State::SingleQuote;
                    out.push(c);
                }
                ('"', _) => {
                    state = State::DoubleQuote;
                    out.push(c);
                }
                ('`', _) => {
                    state = State::Template;
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    state = State::Code;
                    out.push(' ');
                    out.push(' ');
                    i += 2;
                    continue;
                }
                out.push(if c == '\n' { '\n' } else { ' ' });
            }
            State::SingleQuote | State::DoubleQuote | State::Template => {
                let closing = match state {
                    State::SingleQuote => '\'',
                    State::DoubleQuote => '"',
                    State::Template => '`',
                    State::Code | State::LineComment | State::BlockComment => unreachable!(),
                };
                if c == '\\' && next.is_some() {
                    out.push(c);
                    out.push(next.unwrap());
                    i += 2;
                    continue;
                }
                if c == closing {
                    state = State::Code;
                }
                out.push(c);
            }
        }
        i += 1;
    }
    out
}

fn specifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?x)
            (?:\bimport\s+(?:[^'"]*?\sfrom\s+)?|\bexport\s+(?:[^'"]*?\sfrom\s+)?)
            ['"](?P<spec1>[^'"]+)['"]
            | \brequire\s*\(\s*['"](?P<spec2>[^'"]+)['"]\s*\)
            | \bimport\s*\(\s*['"](?P<spec3>[^'"]+)['"]\s*\)
            "#,
        )
        .unwrap()
    })
}

fn top_level_of(spec: &str) -> &str {
    if let Some(rest) = spec.strip_prefix('@') {
        if let Some(idx) = rest.find('/') {
            return &spec[..idx + 1 + rest[..idx].len()];
        }
        return spec;
    }
    spec.split('/').next().unwrap_or(spec)
}

pub struct TsJsExtractor {
    pub include_absolute: bool,
}

impl LanguageExtractor for TsJsExtractor {
    fn extract(&self, text: &str, internal_prefixes: &BTreeSet<String>) -> Vec<ImportSpec> {
        let stripped = strip_comments(text);
        let mut specs = Vec::new();

        for caps in specifier_re().captures_iter(&stripped) {
            let spec = caps
                .name("spec1")
                .or_else(|| caps.name("spec2"))
                .or_else(|| caps.name("spec3"))
                .map(|m| m.as_str())
                .unwrap_or("");
            if spec.is_empty() {
                continue;
            }

            let is_relative = spec.starts_with("./") || spec.starts_with("../");
            if !is_relative {
                let top = top_level_of(spec);
                let keep = self.include_absolute || internal_prefixes.contains(top);
                if !keep {
                    continue;
                }
            }

            specs.push(ImportSpec {
                import_text: spec.to_string(),
                candidates: vec![spec.to_string()],
            });
        }

        dedupe_sorted(specs)
    }
}
