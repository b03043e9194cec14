//! The root view over a parsed document.

use crate::{
    config::Configuration,
    document::Document,
    index::SpanKind,
    section::{self, Section},
    view::{Anchor, ViewCore, view_common, view_queries},
};
use std::{cell::RefCell, rc::Rc};

/// A parsed wikitext document.
///
/// The root view owns nothing special: like every other view it is a cheap
/// handle over the shared buffer, and its span is always the whole buffer.
#[derive(Clone)]
pub struct WikiText {
    pub(crate) core: ViewCore,
}

impl WikiText {
    /// Parses `text` into a root view using the default configuration.
    pub fn new(text: &str) -> Self {
        Self {
            core: ViewCore::new(ViewCore::parse(text), Anchor::Whole),
        }
    }

    /// Parses `text` into a root view using a custom configuration.
    pub fn with_config(text: &str, config: &'static Configuration) -> Self {
        let doc = Rc::new(RefCell::new(Document::with_config(text, config)));
        Self {
            core: ViewCore::new(doc, Anchor::Whole),
        }
    }

    /// The document's sections: the lead first, then one section per
    /// heading line, each running up to the next heading line of any
    /// level.
    pub fn sections(&self) -> Vec<Section> {
        section::sections(&self.core)
    }

    /// The raw spans of `kind`, in discovery order. Mostly useful for
    /// debugging and for asserting on the shape of a parse.
    pub fn spans(&self, kind: SpanKind) -> Vec<(usize, usize)> {
        self.core
            .doc()
            .borrow()
            .index()
            .spans(kind)
            .iter()
            .map(|span| (span.start, span.end))
            .collect()
    }
}

view_common!(WikiText);
view_queries!(WikiText);
