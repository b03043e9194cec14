//! Triple-brace parameter views.

use crate::{
    index::SpanKind,
    scanner::top_level_indices,
    textmap::Span,
    view::{ViewCore, interior, outermost, view_common, view_queries},
};

/// A template parameter view, `{{{name|default}}}`.
#[derive(Clone)]
pub struct Parameter {
    pub(crate) core: ViewCore,
}

impl Parameter {
    /// Parses `text` as the serialised form of a single parameter,
    /// selecting the outermost one when several nest.
    pub fn new(text: &str) -> Self {
        let doc = ViewCore::parse(text);
        let anchor = outermost(&doc, SpanKind::Parameter);
        Self {
            core: ViewCore::new(doc, anchor),
        }
    }

    pub(crate) fn from_core(core: ViewCore) -> Self {
        Self { core }
    }

    /// The parameter name: the text between `{{{` and the first top-level
    /// `|`, or everything up to the closing braces when there is no
    /// default.
    pub fn name(&self) -> String {
        let text = self.core.chars();
        let name = name_span(&text);
        text[name.into_range()].iter().collect()
    }

    /// Replaces the parameter name.
    pub fn set_name(&mut self, name: &str) {
        let text = self.core.chars();
        self.core.splice_relative(name_span(&text), name);
    }

    /// `"|"` when a default value is present, `""` otherwise.
    pub fn pipe(&self) -> String {
        let text = self.core.chars();
        if pipe_index(&text).is_some() {
            "|".to_string()
        } else {
            String::new()
        }
    }

    /// The default value, or `""` when there is no pipe.
    pub fn default(&self) -> String {
        let text = self.core.chars();
        let body = interior(&text, "{{{", "}}}");
        match pipe_index(&text) {
            Some(pipe) => text[body.start + pipe + 1..body.end].iter().collect(),
            None => String::new(),
        }
    }

    /// Replaces the default value. On a parameter with no pipe, the pipe
    /// and the value are inserted verbatim before the closing braces.
    pub fn set_default(&mut self, value: &str) {
        let text = self.core.chars();
        let body = interior(&text, "{{{", "}}}");
        match pipe_index(&text) {
            Some(pipe) => {
                self.core
                    .splice_relative(Span::new(body.start + pipe + 1, body.end), value);
            }
            None => {
                self.core
                    .splice_relative(Span::new(body.end, body.end), &format!("|{value}"));
            }
        }
    }
}

view_common!(Parameter);
view_queries!(Parameter);

/// The bounds of the parameter name within the view's text.
fn name_span(text: &[char]) -> Span {
    let body = interior(text, "{{{", "}}}");
    let end = pipe_index(text).unwrap_or(body.len());
    Span::new(body.start, body.start + end)
}

/// The position of the name/default separator, relative to the interior.
fn pipe_index(text: &[char]) -> Option<usize> {
    let body = interior(text, "{{{", "}}}");
    top_level_indices(&text[body.into_range()], '|')
        .first()
        .copied()
}
