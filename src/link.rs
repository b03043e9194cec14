//! Internal and external link views.

use crate::{
    index::SpanKind,
    scanner::{ends_with, top_level_indices},
    textmap::Span,
    view::{ViewCore, interior, outermost, view_common, view_queries},
};

/// An internal link view, `[[target|text]]`.
#[derive(Clone)]
pub struct WikiLink {
    pub(crate) core: ViewCore,
}

impl WikiLink {
    /// Parses `text` as the serialised form of a single wikilink,
    /// selecting the outermost one when several nest.
    pub fn new(text: &str) -> Self {
        let doc = ViewCore::parse(text);
        let anchor = outermost(&doc, SpanKind::WikiLink);
        Self {
            core: ViewCore::new(doc, anchor),
        }
    }

    pub(crate) fn from_core(core: ViewCore) -> Self {
        Self { core }
    }

    /// The link target: everything between `[[` and the first top-level
    /// `|`, or the whole interior when there is no pipe. Targets may
    /// contain newlines.
    pub fn target(&self) -> String {
        let text = self.core.chars();
        let target = target_span(&text);
        text[target.into_range()].iter().collect()
    }

    /// Replaces the link target.
    pub fn set_target(&mut self, target: &str) {
        let text = self.core.chars();
        self.core.splice_relative(target_span(&text), target);
    }

    /// The link text: everything after the first top-level `|`, or `""`
    /// when there is no pipe.
    pub fn text(&self) -> String {
        let text = self.core.chars();
        let body = interior(&text, "[[", "]]");
        match pipe_index(&text) {
            Some(pipe) => text[body.start + pipe + 1..body.end].iter().collect(),
            None => String::new(),
        }
    }

    /// Replaces the link text. On a link with no pipe, the pipe and the
    /// text are inserted before the closing brackets.
    pub fn set_text(&mut self, value: &str) {
        let text = self.core.chars();
        let body = interior(&text, "[[", "]]");
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

view_common!(WikiLink);
view_queries!(WikiLink);

/// The bounds of a wikilink target within the view's text.
fn target_span(text: &[char]) -> Span {
    let body = interior(text, "[[", "]]");
    let end = pipe_index(text).unwrap_or(body.len());
    Span::new(body.start, body.start + end)
}

/// The position of the target/text separator, relative to the interior.
fn pipe_index(text: &[char]) -> Option<usize> {
    let body = interior(text, "[[", "]]");
    top_level_indices(&text[body.into_range()], '|')
        .first()
        .copied()
}

/// An external link view, bare (`http://…`) or bracketed
/// (`[http://… text]`).
#[derive(Clone)]
pub struct ExternalLink {
    pub(crate) core: ViewCore,
}

impl ExternalLink {
    /// Parses `text` as the serialised form of a single external link.
    pub fn new(text: &str) -> Self {
        let doc = ViewCore::parse(text);
        let anchor = outermost(&doc, SpanKind::ExternalLink);
        Self {
            core: ViewCore::new(doc, anchor),
        }
    }

    pub(crate) fn from_core(core: ViewCore) -> Self {
        Self { core }
    }

    /// True when the source form is `[URL …]`.
    pub fn in_brackets(&self) -> bool {
        self.core.chars().first() == Some(&'[')
    }

    /// The URL: for a bracketed link the text between `[` and the first
    /// whitespace or `]`, for a bare link the whole span.
    pub fn url(&self) -> String {
        let text = self.core.chars();
        let url = url_span(&text);
        text[url.into_range()].iter().collect()
    }

    /// Replaces the URL, preserving the bracketing state.
    pub fn set_url(&mut self, url: &str) {
        let text = self.core.chars();
        if text.first() == Some(&'[') {
            self.core.splice_relative(url_span(&text), url);
        } else {
            self.core.set_text(url);
        }
    }

    /// The link text: for a bracketed link everything after the first
    /// whitespace (`""` when there is none), for a bare link the URL
    /// itself.
    pub fn text(&self) -> String {
        let text = self.core.chars();
        if text.first() != Some(&'[') {
            return self.url();
        }
        match text_span(&text) {
            Some(span) => text[span.into_range()].iter().collect(),
            None => String::new(),
        }
    }

    /// Replaces the link text. A bare link is upgraded to the bracketed
    /// form `[url text]`.
    pub fn set_text(&mut self, value: &str) {
        let text = self.core.chars();
        if text.first() != Some(&'[') {
            let upgraded = format!("[{} {value}]", self.url());
            self.core.set_text(&upgraded);
            return;
        }
        match text_span(&text) {
            Some(span) => self.core.splice_relative(span, value),
            None => {
                // no text yet: insert one separating space before the `]`
                let at = interior(&text, "[", "]").end;
                self.core
                    .splice_relative(Span::new(at, at), &format!(" {value}"));
            }
        }
    }
}

view_common!(ExternalLink);
view_queries!(ExternalLink);

/// The bounds of the URL within a bracketed link; the whole text for a
/// bare one.
fn url_span(text: &[char]) -> Span {
    if text.first() != Some(&'[') {
        return Span::new(0, text.len());
    }
    let end = (1..text.len())
        .find(|&i| text[i].is_whitespace() || text[i] == ']')
        .unwrap_or(text.len());
    Span::new(1, end)
}

/// The bounds of the trailing text within a bracketed link, when present.
fn text_span(text: &[char]) -> Option<Span> {
    let url = url_span(text);
    if url.end >= text.len() || text[url.end] == ']' {
        return None;
    }
    let end = if ends_with(text, "]") {
        text.len() - 1
    } else {
        text.len()
    };
    Some(Span::new(url.end + 1, end.max(url.end + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wikilink_target_and_text() {
        let wl = WikiLink::new("[[A | faf a\n\nfads]]");
        assert_eq!(wl.target(), "A ");
        assert_eq!(wl.text(), " faf a\n\nfads");
    }

    #[test]
    fn wikilink_set_target() {
        let mut wl = WikiLink::new("[[A | B]]");
        wl.set_target(" C ");
        assert_eq!(wl.string(), "[[ C | B]]");
    }

    #[test]
    fn wikilink_set_text() {
        let mut wl = WikiLink::new("[[A | B]]");
        wl.set_text(" C ");
        assert_eq!(wl.string(), "[[A | C ]]");
    }

    #[test]
    fn wikilink_set_text_without_pipe() {
        let mut wl = WikiLink::new("[[A]]");
        assert_eq!(wl.text(), "");
        wl.set_text("B");
        assert_eq!(wl.string(), "[[A|B]]");
    }

    #[test]
    fn bracketed_mailto() {
        let s = "[mailto:info@example.org?Subject=URL%20Encoded%20Subject&body=Body%20Textinfo]";
        let el = ExternalLink::new(s);
        assert_eq!(el.url(), &s[1..s.len() - 1]);
        assert_eq!(el.text(), "");
        assert!(el.in_brackets());
    }

    #[test]
    fn bare_link() {
        let el = ExternalLink::new("HTTP://mediawiki.org");
        assert_eq!(el.url(), "HTTP://mediawiki.org");
        assert_eq!(el.text(), "HTTP://mediawiki.org");
        assert!(!el.in_brackets());
    }

    #[test]
    fn bracketed_with_text() {
        let el = ExternalLink::new("[ftp://mediawiki.org mediawiki ftp]");
        assert_eq!(el.url(), "ftp://mediawiki.org");
        assert_eq!(el.text(), "mediawiki ftp");
        assert!(el.in_brackets());
    }

    #[test]
    fn set_text() {
        let mut el = ExternalLink::new("[ftp://mediawiki.org mediawiki ftp]");
        el.set_text("mwftp");
        assert_eq!(el.string(), "[ftp://mediawiki.org mwftp]");

        let mut el = ExternalLink::new("ftp://mediawiki.org");
        el.set_text("mwftp");
        assert_eq!(el.string(), "[ftp://mediawiki.org mwftp]");
    }

    #[test]
    fn set_text_on_textless_brackets() {
        let mut el = ExternalLink::new("[http://mediawiki.org]");
        el.set_text("MW");
        assert_eq!(el.string(), "[http://mediawiki.org MW]");
    }

    #[test]
    fn set_url() {
        let mut el = ExternalLink::new("[ftp://mediawiki.org mw]");
        el.set_url("https://www.mediawiki.org/");
        assert_eq!(el.string(), "[https://www.mediawiki.org/ mw]");

        let mut el = ExternalLink::new("ftp://mediawiki.org");
        el.set_url("https://www.mediawiki.org/");
        assert_eq!(el.string(), "https://www.mediawiki.org/");
    }
}
