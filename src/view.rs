//! Shared plumbing for every view type.
//!
//! A view is a cheap cloneable handle: a shared pointer to the document
//! state plus an anchor identifying the view's span. Structural accessors
//! re-parse their span's contents on every read, so handles created by a
//! parent accessor are always fresh. Handles held across an edit keep
//! pointing at their construct: an in-place edit shifts the span index
//! directly, and an edit that forces a rescan leaves a remap table behind
//! that indexed anchors follow lazily on their next resolution.

use crate::{
    document::Document,
    index::SpanKind,
    textmap::Span,
};
use std::{cell::RefCell, rc::Rc};

/// How a view finds its span.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Anchor {
    /// The whole buffer.
    Whole,

    /// A position within the span index as of `generation`. Kept current
    /// by the edit propagator for in-place edits, and remapped through the
    /// document's rescan tables when the index was rebuilt.
    Indexed {
        kind: SpanKind,
        generation: u64,
        position: usize,
    },

    /// A span carried by the view itself. Used for constructs that are not
    /// indexed (arguments, sections, cells) and for a view whose edit
    /// replaced its construct with something that is no longer a single
    /// construct; parents re-derive these on each access.
    Direct(Span),
}

/// The state shared by every view type.
#[derive(Clone)]
pub(crate) struct ViewCore {
    /// The document handle.
    doc: Rc<RefCell<Document>>,

    /// The anchor identifying the view's span.
    anchor: RefCell<Anchor>,
}

impl ViewCore {
    /// Creates a view over `doc` with the given anchor.
    pub fn new(doc: Rc<RefCell<Document>>, anchor: Anchor) -> Self {
        Self {
            doc,
            anchor: RefCell::new(anchor),
        }
    }

    /// Parses `text` into a fresh document.
    pub fn parse(text: &str) -> Rc<RefCell<Document>> {
        Rc::new(RefCell::new(Document::new(text)))
    }

    /// The document handle.
    pub fn doc(&self) -> &Rc<RefCell<Document>> {
        &self.doc
    }

    /// Resolves the view's current span. A span that no longer exists
    /// (its construct did not survive a rescan) resolves as empty.
    pub fn span(&self) -> Span {
        self.refresh();
        let doc = self.doc.borrow();
        match *self.anchor.borrow() {
            Anchor::Whole => Span::new(0, doc.len()),
            Anchor::Indexed { kind, position, .. } => doc
                .index()
                .get(kind, position)
                .unwrap_or(Span::new(0, 0)),
            Anchor::Direct(span) => span,
        }
    }

    /// Follows any rescans that happened since an indexed anchor was
    /// minted, so the handle keeps addressing the construct it was created
    /// for rather than whatever now occupies its old numeric position.
    fn refresh(&self) {
        let doc = self.doc.borrow();
        let mut anchor = self.anchor.borrow_mut();
        loop {
            let Anchor::Indexed {
                kind,
                generation,
                position,
            } = *anchor
            else {
                return;
            };
            if generation >= doc.generation() {
                return;
            }
            *anchor = match doc.remap(generation, kind, position) {
                Some(position) => Anchor::Indexed {
                    kind,
                    generation: generation + 1,
                    position,
                },
                // the construct did not survive; the handle degrades to an
                // empty span
                None => Anchor::Direct(Span::new(0, 0)),
            };
        }
    }

    /// The view's text.
    pub fn text(&self) -> String {
        let span = self.span();
        self.doc.borrow().slice(span)
    }

    /// The view's text, as code points.
    pub fn chars(&self) -> Vec<char> {
        let span = self.span();
        self.doc.borrow().chars(span)
    }

    /// Replaces the view's text. This is the universal edit primitive;
    /// every other setter lowers to a splice. The edited view always comes
    /// out covering exactly the replacement.
    pub fn set_text(&self, value: &str) {
        let span = self.span();
        let (new_span, rescanned) = self.doc.borrow_mut().splice(span, value);
        let mut anchor = self.anchor.borrow_mut();
        match *anchor {
            Anchor::Whole => {}
            Anchor::Indexed { kind, position, .. } => {
                if rescanned {
                    // The replacement need not be a single construct any
                    // more. Re-anchor into the fresh index when it still
                    // is one; otherwise keep addressing the replaced
                    // region directly.
                    let doc = self.doc.borrow();
                    *anchor = match doc.position_of(kind, new_span) {
                        Some(position) => Anchor::Indexed {
                            kind,
                            generation: doc.generation(),
                            position,
                        },
                        None => Anchor::Direct(new_span),
                    };
                } else {
                    self.doc.borrow_mut().update_index(kind, position, new_span);
                }
            }
            Anchor::Direct(_) => *anchor = Anchor::Direct(new_span),
        }
    }

    /// Replaces `local`, a span relative to the view's own span, leaving
    /// the rest of the view untouched.
    pub fn splice_relative(&self, local: Span, value: &str) {
        let span = self.span();
        let absolute = Span::new(span.start + local.start, span.start + local.end);
        self.doc.borrow_mut().splice(absolute, value);

        // An indexed anchor is grown by the shift rules (or remapped after
        // a rescan); a direct anchor has to be grown by hand.
        if let Anchor::Direct(own) = &mut *self.anchor.borrow_mut() {
            let delta = value.chars().count() as isize - local.len() as isize;
            let end = span
                .end
                .checked_add_signed(delta)
                .expect("view span shrank below zero");
            *own = Span::new(span.start, end);
        }
    }

    /// A direct handle over `span` within the same document.
    pub fn direct(&self, span: Span) -> ViewCore {
        ViewCore::new(Rc::clone(&self.doc), Anchor::Direct(span))
    }

    /// Handles for every indexed span of `kind` that lies inside this view.
    pub fn contained(&self, kind: SpanKind) -> Vec<ViewCore> {
        let span = self.span();
        let doc = self.doc.borrow();
        let generation = doc.generation();
        doc.index()
            .spans(kind)
            .iter()
            .enumerate()
            .filter(|(_, candidate)| span.contains(**candidate))
            .map(|(position, _)| {
                ViewCore::new(
                    Rc::clone(&self.doc),
                    Anchor::Indexed {
                        kind,
                        generation,
                        position,
                    },
                )
            })
            .collect()
    }
}

/// The interior of a delimited construct, as a span relative to the view's
/// text. Malformed input degrades gracefully: a missing opener or closer
/// simply does not shrink that side.
pub(crate) fn interior(text: &[char], open: &str, close: &str) -> Span {
    let start = if crate::scanner::starts_with(text, 0, open) {
        open.chars().count()
    } else {
        0
    };
    let close_len = close.chars().count();
    let end = if text.len() - start >= close_len && crate::scanner::ends_with(text, close) {
        text.len() - close_len
    } else {
        text.len()
    };
    Span::new(start, end.max(start))
}

/// Anchors a single-construct view at the outermost discovered span of
/// `kind`, degrading to the whole buffer when nothing was recognised.
pub(crate) fn outermost(doc: &Rc<RefCell<Document>>, kind: SpanKind) -> Anchor {
    let doc = doc.borrow();
    let count = doc.index().spans(kind).len();
    if count == 0 {
        Anchor::Whole
    } else {
        Anchor::Indexed {
            kind,
            generation: doc.generation(),
            position: count - 1,
        }
    }
}

/// Generates the text plumbing every view type shares: `string`,
/// `set_string`, `Display`, and the `TypeName("…")` `Debug` form.
macro_rules! view_common {
    ($ty:ident) => {
        impl $ty {
            /// The source text of this view.
            pub fn string(&self) -> String {
                self.core.text()
            }

            /// Replaces the source text of this view. Every other view over
            /// the same buffer keeps pointing at its own construct.
            pub fn set_string(&mut self, value: &str) {
                self.core.set_text(value);
            }
        }

        impl core::fmt::Display for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.string())
            }
        }

        impl core::fmt::Debug for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!(stringify!($ty), "({:?})"), self.string())
            }
        }
    };
}
pub(crate) use view_common;

/// Generates the scoped collection accessors: every indexed construct whose
/// span lies inside the view's own span.
macro_rules! view_queries {
    ($ty:ident) => {
        impl $ty {
            /// The templates inside this view, innermost first.
            pub fn templates(&self) -> Vec<$crate::template::Template> {
                self.core
                    .contained($crate::index::SpanKind::Template)
                    .into_iter()
                    .map($crate::template::Template::from_core)
                    .collect()
            }

            /// The triple-brace parameters inside this view, innermost
            /// first.
            pub fn parameters(&self) -> Vec<$crate::parameter::Parameter> {
                self.core
                    .contained($crate::index::SpanKind::Parameter)
                    .into_iter()
                    .map($crate::parameter::Parameter::from_core)
                    .collect()
            }

            /// The parser functions inside this view, innermost first.
            pub fn parser_functions(&self) -> Vec<$crate::template::ParserFunction> {
                self.core
                    .contained($crate::index::SpanKind::ParserFunction)
                    .into_iter()
                    .map($crate::template::ParserFunction::from_core)
                    .collect()
            }

            /// The wikilinks inside this view, innermost first.
            pub fn wikilinks(&self) -> Vec<$crate::link::WikiLink> {
                self.core
                    .contained($crate::index::SpanKind::WikiLink)
                    .into_iter()
                    .map($crate::link::WikiLink::from_core)
                    .collect()
            }

            /// The external links inside this view.
            pub fn external_links(&self) -> Vec<$crate::link::ExternalLink> {
                self.core
                    .contained($crate::index::SpanKind::ExternalLink)
                    .into_iter()
                    .map($crate::link::ExternalLink::from_core)
                    .collect()
            }

            /// The comments inside this view.
            pub fn comments(&self) -> Vec<$crate::comment::Comment> {
                self.core
                    .contained($crate::index::SpanKind::Comment)
                    .into_iter()
                    .map($crate::comment::Comment::from_core)
                    .collect()
            }
        }
    };
}
pub(crate) use view_queries;
