//! The shared state behind every view of one parse.

use crate::{
    config::{CONFIG, Configuration},
    index::{SpanIndex, SpanKind},
    scanner::Scanner,
    textmap::Span,
};
use indexmap::IndexMap;

/// Tokens that can open or close a construct. A replacement containing one
/// may change the structure of the document, so the span index cannot be
/// patched in place.
const STRUCTURAL_TOKENS: [&str; 8] = [
    "{{", "}}", "[[", "]]", "<!--", "-->", "<nowiki", "</nowiki",
];

/// For one rescan and one kind: old index position → position in the fresh
/// index, or `None` when the construct did not survive the rescan.
type Remap = IndexMap<SpanKind, Vec<Option<usize>>>;

/// The shared state behind every view of one parse: the code-point buffer
/// and the span index computed from it.
pub(crate) struct Document {
    /// The backing buffer.
    buffer: Vec<char>,

    /// The configuration used for discovery.
    config: &'static Configuration,

    /// The span index for the current buffer contents.
    index: SpanIndex,

    /// Bumped on every rescan, so outstanding handles can tell that the
    /// index they were anchored into has been replaced.
    generation: u64,

    /// One remap table per rescan, indexed by the generation it upgrades
    /// from. Lets a handle minted against an older index follow its
    /// construct into the current one.
    remaps: Vec<Remap>,
}

impl Document {
    /// Parses `text` into a new document using the default configuration.
    pub fn new(text: &str) -> Self {
        Self::with_config(text, &CONFIG)
    }

    /// Parses `text` into a new document.
    pub fn with_config(text: &str, config: &'static Configuration) -> Self {
        let buffer: Vec<char> = text.chars().collect();
        let index = Scanner::new(config).scan(&buffer);
        Self {
            buffer,
            config,
            index,
            generation: 0,
            remaps: Vec::new(),
        }
    }

    /// The buffer length, in code points.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// The span index.
    pub fn index(&self) -> &SpanIndex {
        &self.index
    }

    /// The current index generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Follows one rescan's remap table: where the span at `position` of
    /// `kind` in the index of `generation` ended up in the next one.
    pub fn remap(&self, generation: u64, kind: SpanKind, position: usize) -> Option<usize> {
        self.remaps
            .get(usize::try_from(generation).ok()?)?
            .get(&kind)?
            .get(position)
            .copied()
            .flatten()
    }

    /// The current index position of the span of `kind` with exactly these
    /// bounds.
    pub fn position_of(&self, kind: SpanKind, span: Span) -> Option<usize> {
        self.index
            .spans(kind)
            .iter()
            .position(|&candidate| candidate == span)
    }

    /// Overwrites one index entry, for the view that was just edited.
    pub fn update_index(&mut self, kind: SpanKind, position: usize, span: Span) {
        self.index.set(kind, position, span);
    }

    /// Renders the buffer slice under `span`. Out-of-range spans (from a
    /// stale handle) render as much as still exists.
    pub fn slice(&self, span: Span) -> String {
        let span = self.clamp(span);
        self.buffer[span.into_range()].iter().collect()
    }

    /// The buffer slice under `span`, as code points.
    pub fn chars(&self, span: Span) -> Vec<char> {
        let span = self.clamp(span);
        self.buffer[span.into_range()].to_vec()
    }

    /// Replaces `span` with `replacement`, shifting every indexed span so
    /// that other views keep pointing at their constructs. Returns the span
    /// covering the replacement, and whether the index had to be rebuilt
    /// instead of shifted in place.
    pub fn splice(&mut self, span: Span, replacement: &str) -> (Span, bool) {
        let Span { start, end } = self.clamp(span);
        let new: Vec<char> = replacement.chars().collect();
        let new_len = new.len();
        let delta = new_len as isize - (end - start) as isize;
        self.buffer.splice(start..end, new);

        let mut rebuild = contains_structural_token(replacement, self.config);
        for span in self.index.iter_mut() {
            if span.end <= start {
                // entirely before the edit
            } else if span.start >= end {
                span.start = shifted(span.start, delta);
                span.end = shifted(span.end, delta);
            } else if span.start <= start && end <= span.end {
                // the edited region is inside this span
                span.end = shifted(span.end, delta);
            } else {
                // consumed by the edit; collapsed so the remap below
                // reports the construct gone
                *span = Span::new(start, start);
                rebuild = true;
            }
        }

        if rebuild {
            self.rebuild();
        }
        (Span::new(start, start + new_len), rebuild)
    }

    /// Discards the span index, recomputes it from the current buffer, and
    /// records a remap table so outstanding handles can follow their
    /// constructs into the fresh index.
    fn rebuild(&mut self) {
        log::debug!("edit crossed a structural boundary; rescanning");
        let old = core::mem::take(&mut self.index);
        self.index = Scanner::new(self.config).scan(&self.buffer);

        let mut remap = Remap::default();
        for (kind, spans) in old.iter() {
            let new_spans = self.index.spans(kind);
            remap.insert(
                kind,
                spans
                    .iter()
                    .map(|&span| remap_position(new_spans, span))
                    .collect(),
            );
        }
        self.remaps.push(remap);
        self.generation += 1;
    }

    /// Restricts `span` to the current buffer bounds.
    fn clamp(&self, span: Span) -> Span {
        let start = span.start.min(self.buffer.len());
        Span::new(start, span.end.clamp(start, self.buffer.len()))
    }
}

/// Finds the span matching `old` in a freshly scanned list: an exact match
/// when the construct rescanned to the same (already shift-adjusted)
/// bounds, otherwise the tightest span still covering the old region.
/// Empty spans never survive a rescan.
fn remap_position(new_spans: &[Span], old: Span) -> Option<usize> {
    if old.is_empty() {
        return None;
    }
    if let Some(position) = new_spans.iter().position(|&candidate| candidate == old) {
        return Some(position);
    }
    new_spans
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.contains(old))
        .min_by_key(|(_, candidate)| candidate.len())
        .map(|(position, _)| position)
}

/// Applies a signed offset to a position.
fn shifted(position: usize, delta: isize) -> usize {
    position
        .checked_add_signed(delta)
        .unwrap_or_else(|| panic!("span position {position} shifted out of range"))
}

/// Returns true when `replacement` could change the structure of the
/// document.
fn contains_structural_token(replacement: &str, config: &Configuration) -> bool {
    if STRUCTURAL_TOKENS
        .iter()
        .any(|token| replacement.contains(token))
    {
        return true;
    }
    let lowered = replacement.to_lowercase();
    config
        .protocols
        .iter()
        .any(|proto| lowered.contains(proto))
}
