//! The span index: one ordered span collection per construct kind.

use crate::textmap::Span;
use indexmap::IndexMap;

/// The kinds of construct tracked by the span index.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpanKind {
    /// A template, `{{…}}`.
    Template,
    /// A triple-brace parameter, `{{{…}}}`.
    Parameter,
    /// A parser function, `{{#name:…}}`.
    ParserFunction,
    /// An internal link, `[[…]]`.
    WikiLink,
    /// An external link, bare or bracketed.
    ExternalLink,
    /// An HTML comment, `<!--…-->`.
    Comment,
    /// A `<nowiki>…</nowiki>` region.
    NoWiki,
}

/// A mapping from construct kind to the spans discovered for it.
///
/// Spans are kept in discovery order: innermost first, outermost last, and
/// in textual order within one nesting depth. Spans are unique within a
/// kind.
#[derive(Debug, Default)]
pub(crate) struct SpanIndex {
    /// The per-kind span collections.
    spans: IndexMap<SpanKind, Vec<Span>>,
}

impl SpanIndex {
    /// Records a newly discovered span.
    pub fn push(&mut self, kind: SpanKind, span: Span) {
        self.spans.entry(kind).or_default().push(span);
    }

    /// The span at `position` within `kind`, if it still exists.
    pub fn get(&self, kind: SpanKind, position: usize) -> Option<Span> {
        self.spans.get(&kind).and_then(|spans| spans.get(position)).copied()
    }

    /// Overwrites the span at `position` within `kind`. Positions that no
    /// longer exist (the index was rebuilt smaller) are ignored.
    pub fn set(&mut self, kind: SpanKind, position: usize, span: Span) {
        if let Some(slot) = self
            .spans
            .get_mut(&kind)
            .and_then(|spans| spans.get_mut(position))
        {
            *slot = span;
        }
    }

    /// All spans of `kind`, in discovery order.
    pub fn spans(&self, kind: SpanKind) -> &[Span] {
        self.spans.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Iterates over every kind present in the index with its spans.
    pub fn iter(&self) -> impl Iterator<Item = (SpanKind, &[Span])> {
        self.spans.iter().map(|(kind, spans)| (*kind, spans.as_slice()))
    }

    /// Iterates mutably over every span of every kind.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Span> {
        self.spans.values_mut().flatten()
    }
}
