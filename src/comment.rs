//! HTML comment views.

use crate::{
    index::SpanKind,
    view::{ViewCore, interior, outermost, view_common, view_queries},
};

/// An HTML comment view, `<!--…-->`.
#[derive(Clone)]
pub struct Comment {
    pub(crate) core: ViewCore,
}

impl Comment {
    /// Parses `text` as the serialised form of a single comment.
    pub fn new(text: &str) -> Self {
        let doc = ViewCore::parse(text);
        let anchor = outermost(&doc, SpanKind::Comment);
        Self {
            core: ViewCore::new(doc, anchor),
        }
    }

    pub(crate) fn from_core(core: ViewCore) -> Self {
        Self { core }
    }

    /// The text strictly between `<!--` and `-->`, or to the end of the
    /// buffer when the comment is unterminated.
    pub fn contents(&self) -> String {
        let text = self.core.chars();
        let body = interior(&text, "<!--", "-->");
        text[body.into_range()].iter().collect()
    }

    /// Replaces the comment contents, keeping the delimiters.
    pub fn set_contents(&mut self, contents: &str) {
        let text = self.core.chars();
        self.core.splice_relative(interior(&text, "<!--", "-->"), contents);
    }
}

view_common!(Comment);
view_queries!(Comment);
