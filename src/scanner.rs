//! The span discovery engine.
//!
//! Discovery runs over a blanked working copy of the buffer. Each pass
//! recognises the innermost constructs still visible, records their spans,
//! and overwrites the matched region with a placeholder so an enclosing
//! construct can match across it on a later round. Comments and nowiki
//! regions are blanked first, which is what shields the delimiters inside
//! them from every later pass.

use crate::{
    config::Configuration,
    index::{SpanIndex, SpanKind},
    textmap::{CharMap, Span},
};
use std::sync::LazyLock;

/// The placeholder written over recognised regions of the working copy.
const BLANK: char = '_';

/// Comments and nowiki regions. Unterminated regions run to the end of the
/// buffer.
static SHIELD_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?s)<!--.*?(?:-->|\z)|<nowiki>.*?(?:</nowiki>|\z)").unwrap()
});

// The interior of a brace or bracket construct may contain lone brackets
// (`[`, `]`, even `[]`) but never a `[[` or `]]` pair, which belongs to a
// not-yet-recognised wikilink. Expressing that needs a lookahead, hence
// `fancy_regex` for these three patterns.

/// An innermost triple-brace parameter.
static PARAMETER_PATTERN: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    fancy_regex::Regex::new(r"\{\{\{(?:[^{}\[\]]|\[(?!\[)|\](?!\]))*\}\}\}").unwrap()
});

/// An innermost template or parser function.
static BRACE_PATTERN: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    fancy_regex::Regex::new(r"\{\{(?:[^{}\[\]]|\[(?!\[)|\](?!\]))*\}\}").unwrap()
});

/// An innermost wikilink. Braces and newlines are legal anywhere inside.
static WIKILINK_PATTERN: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    fancy_regex::Regex::new(r"\[\[(?:[^\[\]]|\[(?!\[)|\](?!\]))*\]\]").unwrap()
});

/// The span discovery engine.
pub(crate) struct Scanner<'a> {
    /// The configuration for the scanner.
    config: &'a Configuration,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner with the given configuration.
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Computes the span index for `buffer` from scratch.
    pub fn scan(&self, buffer: &[char]) -> SpanIndex {
        let mut index = SpanIndex::default();
        let mut working = buffer.to_vec();

        self.shield_pass(&mut working, &mut index);
        self.link_pass(&working, &mut index);

        let mut round = 0;
        loop {
            round += 1;

            // Directly nested parameters must resolve before the brace pass
            // gets a chance to pair the outer `{{` of a pending `{{{` with
            // an inner parameter's closing braces, so parameters run to a
            // fixpoint first.
            let mut blanked = 0;
            loop {
                let count = self.parameter_pass(&mut working, &mut index);
                blanked += count;
                if count == 0 {
                    break;
                }
            }

            blanked += self.brace_pass(&mut working, &mut index);
            blanked += self.wikilink_pass(&mut working, &mut index);
            log::debug!("bracket round {round}: {blanked} regions recognised");
            if blanked == 0 {
                break;
            }
        }

        index
    }

    /// Records and blanks every comment and nowiki region.
    fn shield_pass(&self, working: &mut [char], index: &mut SpanIndex) {
        let (text, map) = render(working);
        let mut spans = Vec::new();
        for m in SHIELD_PATTERN.find_iter(&text) {
            let kind = if m.as_str().starts_with("<!--") {
                SpanKind::Comment
            } else {
                SpanKind::NoWiki
            };
            spans.push((kind, map.span_of(m.range())));
        }
        for &(kind, span) in &spans {
            log::trace!("{kind:?} shield at {span:?}");
            index.push(kind, span);
            blank(working, span);
        }
    }

    /// Records every external link. Nothing is blanked: the single brackets
    /// and URL text of a link do not interfere with any later pass.
    fn link_pass(&self, working: &[char], index: &mut SpanIndex) {
        let (text, map) = render(working);

        let mut bracketed = Vec::new();
        for m in self.config.bracketed_link_pattern.find_iter(&text) {
            let span = map.span_of(m.range());
            log::trace!("bracketed external link at {span:?}");
            bracketed.push(span);
        }

        let mut links = bracketed.clone();
        for m in self.config.bare_link_pattern.find_iter(&text) {
            let span = map.span_of(m.range());
            if bracketed.iter().any(|outer| outer.contains(span)) {
                continue;
            }
            // A protocol glued to the end of a word is not a link.
            if span.start > 0 && working[span.start - 1].is_alphanumeric() {
                continue;
            }
            log::trace!("bare external link at {span:?}");
            links.push(span);
        }

        links.sort_by_key(|span| span.start);
        for span in links {
            index.push(SpanKind::ExternalLink, span);
        }
    }

    /// Recognises innermost triple-brace parameters. Returns the number of
    /// regions blanked.
    fn parameter_pass(&self, working: &mut [char], index: &mut SpanIndex) -> usize {
        let (text, map) = render(working);
        let spans = find_all(&PARAMETER_PATTERN, &text, &map);
        for &span in &spans {
            log::trace!("parameter at {span:?}");
            index.push(SpanKind::Parameter, span);
            blank(working, span);
        }
        spans.len()
    }

    /// Recognises innermost templates and parser functions. Returns the
    /// number of regions blanked, which includes candidates rejected for an
    /// invalid name.
    fn brace_pass(&self, working: &mut [char], index: &mut SpanIndex) -> usize {
        let (text, map) = render(working);

        let mut matches = Vec::new();
        for m in BRACE_PATTERN.find_iter(&text) {
            let m = match m {
                Ok(m) => m,
                Err(error) => {
                    log::warn!("brace scan aborted: {error}");
                    break;
                }
            };
            let interior = &m.as_str()[2..m.as_str().len() - 2];
            matches.push((map.span_of(m.range()), classify(interior)));
        }

        for &(span, kind) in &matches {
            if let Some(kind) = kind {
                log::trace!("{kind:?} at {span:?}");
                index.push(kind, span);
            } else {
                log::debug!("rejected braces at {span:?}: name contains a line break");
            }
            // A rejected candidate is blanked too, so the scan terminates
            // and an enclosing construct can still close over the region.
            blank(working, span);
        }
        matches.len()
    }

    /// Recognises innermost wikilinks. Returns the number of regions
    /// blanked.
    fn wikilink_pass(&self, working: &mut [char], index: &mut SpanIndex) -> usize {
        let (text, map) = render(working);
        let spans = find_all(&WIKILINK_PATTERN, &text, &map);
        for &span in &spans {
            log::trace!("wikilink at {span:?}");
            index.push(SpanKind::WikiLink, span);
            blank(working, span);
        }
        spans.len()
    }
}

/// Renders the working copy and a byte-to-code-point map for it.
fn render(working: &[char]) -> (String, CharMap) {
    let text: String = working.iter().collect();
    let map = CharMap::new(&text);
    (text, map)
}

/// Overwrites a span of the working copy with the placeholder.
fn blank(working: &mut [char], span: Span) {
    for c in &mut working[span.into_range()] {
        *c = BLANK;
    }
}

/// Collects every non-overlapping match of `pattern`, left to right.
fn find_all(pattern: &fancy_regex::Regex, text: &str, map: &CharMap) -> Vec<Span> {
    let mut spans = Vec::new();
    for m in pattern.find_iter(text) {
        match m {
            Ok(m) => spans.push(map.span_of(m.range())),
            Err(error) => {
                log::warn!("scan aborted: {error}");
                break;
            }
        }
    }
    spans
}

/// Decides whether a brace construct is a template or a parser function,
/// and validates its name. Returns `None` when the name is invalid.
fn classify(interior: &str) -> Option<SpanKind> {
    let head = interior.split('|').next().unwrap_or(interior);
    if let Some((name, _)) = head.split_once(':')
        && is_parser_function_name(name)
    {
        return Some(SpanKind::ParserFunction);
    }
    // The name may be surrounded by whitespace, including line breaks, but
    // a line break inside the trimmed name invalidates the construct.
    if head.trim().contains('\n') {
        None
    } else {
        Some(SpanKind::Template)
    }
}

/// Returns true if `name` is a well-formed parser function name: optional
/// surrounding whitespace, an optional `#` sigil, then an unbroken run of
/// non-whitespace.
fn is_parser_function_name(name: &str) -> bool {
    let name = name.trim();
    let name = name.strip_prefix('#').unwrap_or(name);
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

/// Returns the positions of `needle` within `text` that sit outside every
/// nested brace pair, bracket pair, comment, and nowiki region.
///
/// This is the scanner used by view accessors to split a construct body at
/// its top-level delimiters.
pub(crate) fn top_level_indices(text: &[char], needle: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut braces = 0_usize;
    let mut brackets = 0_usize;
    let mut i = 0;
    while i < text.len() {
        if starts_with(text, i, "<!--") {
            i = find_from(text, i + 4, "-->").map_or(text.len(), |end| end + 3);
        } else if starts_with(text, i, "<nowiki>") {
            i = find_from(text, i + 8, "</nowiki>").map_or(text.len(), |end| end + 9);
        } else if starts_with(text, i, "{{") {
            braces += 1;
            i += 2;
        } else if starts_with(text, i, "}}") {
            braces = braces.saturating_sub(1);
            i += 2;
        } else if starts_with(text, i, "[[") {
            brackets += 1;
            i += 2;
        } else if starts_with(text, i, "]]") {
            brackets = brackets.saturating_sub(1);
            i += 2;
        } else {
            if braces == 0 && brackets == 0 && text[i] == needle {
                positions.push(i);
            }
            i += 1;
        }
    }
    positions
}

/// Returns true if `text` contains `pattern` at position `at`.
pub(crate) fn starts_with(text: &[char], at: usize, pattern: &str) -> bool {
    let mut i = at;
    for c in pattern.chars() {
        if text.get(i) != Some(&c) {
            return false;
        }
        i += 1;
    }
    true
}

/// Returns true if `text` ends with `pattern`.
pub(crate) fn ends_with(text: &[char], pattern: &str) -> bool {
    text.len()
        .checked_sub(pattern.chars().count())
        .is_some_and(|at| starts_with(text, at, pattern))
}

/// Finds the first occurrence of `pattern` at or after `from`.
fn find_from(text: &[char], from: usize, pattern: &str) -> Option<usize> {
    (from..text.len()).find(|&i| starts_with(text, i, pattern))
}
