//! Template and parser-function views and their argument accounting.

use crate::{
    index::SpanKind,
    scanner::top_level_indices,
    textmap::Span,
    view::{Anchor, ViewCore, interior, outermost, view_common, view_queries},
};

/// Which delimiter opens the first argument of a construct.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FirstDelimiter {
    /// Template arguments all start at a `|`.
    Pipe,
    /// The first argument of a parser function starts at the `:` that
    /// terminates its name.
    Colon,
}

/// A template view, `{{name|…}}`.
#[derive(Clone)]
pub struct Template {
    pub(crate) core: ViewCore,
}

impl Template {
    /// Parses `text` as the serialised form of a single template, selecting
    /// the outermost one when several nest.
    pub fn new(text: &str) -> Self {
        let doc = ViewCore::parse(text);
        let anchor = outermost(&doc, SpanKind::Template);
        Self {
            core: ViewCore::new(doc, anchor),
        }
    }

    pub(crate) fn from_core(core: ViewCore) -> Self {
        Self { core }
    }

    /// The template name: everything between `{{` and the first top-level
    /// `|`, verbatim.
    pub fn name(&self) -> String {
        let text = self.core.chars();
        let name = name_span(&text);
        text[name.into_range()].iter().collect()
    }

    /// Replaces the template name, leaving the arguments untouched.
    pub fn set_name(&mut self, name: &str) {
        let text = self.core.chars();
        self.core.splice_relative(name_span(&text), name);
    }

    /// The template's arguments, in source order.
    pub fn arguments(&self) -> Vec<Argument> {
        arguments(&self.core, FirstDelimiter::Pipe)
    }

    /// Deletes every named argument whose name is used again by a later
    /// argument, keeping the last occurrence. Positional arguments are
    /// never removed, and nested templates are not entered.
    pub fn remove_duplicate_arguments(&mut self) {
        remove_duplicate_arguments(|| self.arguments());
    }
}

view_common!(Template);
view_queries!(Template);

/// A parser function view, `{{#name:…}}`.
#[derive(Clone)]
pub struct ParserFunction {
    pub(crate) core: ViewCore,
}

impl ParserFunction {
    /// Parses `text` as the serialised form of a single parser function,
    /// selecting the outermost one when several nest.
    pub fn new(text: &str) -> Self {
        let doc = ViewCore::parse(text);
        let anchor = outermost(&doc, SpanKind::ParserFunction);
        Self {
            core: ViewCore::new(doc, anchor),
        }
    }

    pub(crate) fn from_core(core: ViewCore) -> Self {
        Self { core }
    }

    /// The parser function name: the text between `{{` and the `:`,
    /// whitespace trimmed and without the `#` sigil.
    pub fn name(&self) -> String {
        let text = self.core.chars();
        let raw: String = text[raw_name_span(&text).into_range()].iter().collect();
        let trimmed = raw.trim();
        trimmed.strip_prefix('#').unwrap_or(trimmed).to_string()
    }

    /// Replaces the raw name region (between `{{` and the `:`) verbatim.
    pub fn set_name(&mut self, name: &str) {
        let text = self.core.chars();
        self.core.splice_relative(raw_name_span(&text), name);
    }

    /// The arguments, in source order. The first argument starts at the
    /// `:` terminating the name; the rest start at their `|`.
    pub fn arguments(&self) -> Vec<Argument> {
        arguments(&self.core, FirstDelimiter::Colon)
    }

    /// Deletes every named argument whose name is used again by a later
    /// argument, keeping the last occurrence.
    pub fn remove_duplicate_arguments(&mut self) {
        remove_duplicate_arguments(|| self.arguments());
    }
}

view_common!(ParserFunction);
view_queries!(ParserFunction);

/// A single template or parser-function argument, including its leading
/// delimiter.
#[derive(Clone)]
pub struct Argument {
    pub(crate) core: ViewCore,

    /// The ordinal assigned at creation when the argument is anonymous.
    /// Anonymous arguments are numbered 1, 2, … left to right,
    /// independently of any explicit numeric names.
    position: Option<usize>,
}

impl Argument {
    /// Parses `text` as the serialised form of a single argument,
    /// delimiter included.
    pub fn new(text: &str) -> Self {
        let core = ViewCore::new(ViewCore::parse(text), Anchor::Whole);
        let position = if is_named(&core.chars()) { None } else { Some(1) };
        Self { core, position }
    }

    pub(crate) fn from_parts(core: ViewCore, position: Option<usize>) -> Self {
        Self { core, position }
    }

    /// The argument name: the text before the `=` for a named argument,
    /// otherwise the positional number.
    pub fn name(&self) -> String {
        let text = self.core.chars();
        let body = body_span(&text);
        let slice = &text[body.into_range()];
        match top_level_indices(slice, '=').first() {
            Some(&eq) => slice[..eq].iter().collect(),
            None => self
                .position
                .map_or_else(String::new, |position| position.to_string()),
        }
    }

    /// The argument value: the text after the `=`, or the whole
    /// post-delimiter text for a positional argument.
    pub fn value(&self) -> String {
        let text = self.core.chars();
        let body = body_span(&text);
        let slice = &text[body.into_range()];
        match top_level_indices(slice, '=').first() {
            Some(&eq) => slice[eq + 1..].iter().collect(),
            None => slice.iter().collect(),
        }
    }

    /// `"="` for a named argument, `""` for a positional one.
    pub fn equal_sign(&self) -> String {
        let text = self.core.chars();
        if is_named(&text) { "=".to_string() } else { String::new() }
    }

    /// Renames the argument. A positional argument becomes named: the name
    /// and an `=` are inserted in front of its value.
    pub fn set_name(&mut self, name: &str) {
        let text = self.core.chars();
        let body = body_span(&text);
        let slice = &text[body.into_range()];
        match top_level_indices(slice, '=').first() {
            Some(&eq) => {
                self.core
                    .splice_relative(Span::new(body.start, body.start + eq), name);
            }
            None => {
                self.core
                    .splice_relative(Span::new(body.start, body.start), &format!("{name}="));
            }
        }
    }

    /// Replaces the argument value, preserving the name and the `=`.
    pub fn set_value(&mut self, value: &str) {
        let text = self.core.chars();
        let body = body_span(&text);
        let slice = &text[body.into_range()];
        let start = match top_level_indices(slice, '=').first() {
            Some(&eq) => body.start + eq + 1,
            None => body.start,
        };
        self.core.splice_relative(Span::new(start, body.end), value);
    }

    /// The explicit name of a named argument.
    fn explicit_name(&self) -> Option<String> {
        let text = self.core.chars();
        let body = body_span(&text);
        let slice = &text[body.into_range()];
        top_level_indices(slice, '=')
            .first()
            .map(|&eq| slice[..eq].iter().collect())
    }
}

view_common!(Argument);
view_queries!(Argument);

/// The bounds of the template name within the view's text.
fn name_span(text: &[char]) -> Span {
    let body = interior(text, "{{", "}}");
    let slice = &text[body.into_range()];
    let end = top_level_indices(slice, '|')
        .first()
        .copied()
        .unwrap_or(slice.len());
    Span::new(body.start, body.start + end)
}

/// The bounds of the raw parser function name within the view's text:
/// everything between `{{` and the first top-level `:`.
fn raw_name_span(text: &[char]) -> Span {
    let body = interior(text, "{{", "}}");
    let slice = &text[body.into_range()];
    let end = top_level_indices(slice, ':')
        .first()
        .copied()
        .unwrap_or(slice.len());
    Span::new(body.start, body.start + end)
}

/// The post-delimiter bounds of an argument within its text.
fn body_span(text: &[char]) -> Span {
    let start = usize::from(matches!(text.first(), Some('|' | ':')));
    Span::new(start, text.len())
}

/// Returns true when the post-delimiter text carries a top-level `=`.
fn is_named(text: &[char]) -> bool {
    let body = body_span(text);
    !top_level_indices(&text[body.into_range()], '=').is_empty()
}

/// Splits a construct body into argument views.
fn arguments(core: &ViewCore, first: FirstDelimiter) -> Vec<Argument> {
    let text = core.chars();
    let span = core.span();
    let body = interior(&text, "{{", "}}");
    let slice = &text[body.into_range()];

    let starts = match first {
        FirstDelimiter::Pipe => top_level_indices(slice, '|'),
        FirstDelimiter::Colon => {
            let Some(&colon) = top_level_indices(slice, ':').first() else {
                return Vec::new();
            };
            let mut starts = vec![colon];
            starts.extend(
                top_level_indices(slice, '|')
                    .into_iter()
                    .filter(|&at| at > colon),
            );
            starts
        }
    };

    let mut views = Vec::new();
    let mut ordinal = 0;
    for (i, &at) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(slice.len());
        let position = if is_named(&slice[at..end]) {
            None
        } else {
            ordinal += 1;
            Some(ordinal)
        };
        let absolute = Span::new(span.start + body.start + at, span.start + body.start + end);
        views.push(Argument::from_parts(core.direct(absolute), position));
    }
    views
}

/// Removes earlier duplicates of named arguments, re-deriving the argument
/// list after every removal so spans stay current.
fn remove_duplicate_arguments(fetch: impl Fn() -> Vec<Argument>) {
    loop {
        let args = fetch();
        let names: Vec<Option<String>> = args.iter().map(Argument::explicit_name).collect();
        let victim = (0..args.len()).find(|&i| {
            names[i].is_some() && names[i + 1..].iter().any(|later| *later == names[i])
        });
        match victim {
            Some(i) => {
                if let Some(mut argument) = args.into_iter().nth(i) {
                    argument.set_string("");
                }
            }
            None => break,
        }
    }
}
