//! Section views and heading-line recognition.

use crate::{
    textmap::Span,
    view::{Anchor, ViewCore, view_common, view_queries},
};
use std::sync::LazyLock;

/// Matches a heading line: an opening run of equal signs, a title, and a
/// closing run repeating the opening run exactly. Excess equal signs on the
/// longer side belong to the title, and the engine tries the longest
/// opening run first, which is what the backreference encodes.
static HEADING_PATTERN: LazyLock<fancy_regex::Regex> =
    LazyLock::new(|| fancy_regex::Regex::new(r"^(={1,6})(.+?)\1[ \t]*$").unwrap());

/// The error raised when renaming the lead section, which has no heading.
#[derive(Debug, thiserror::Error)]
#[error("the lead section has no title")]
pub struct LeadSectionError;

/// The shape of one heading line.
pub(crate) struct HeadingShape {
    /// The heading outline level.
    pub level: u8,

    /// Title bounds within the heading line, in code points.
    pub title: Span,
}

/// Parses `line` (without its terminator) as a heading.
pub(crate) fn heading_shape(line: &[char]) -> Option<HeadingShape> {
    let text: String = line.iter().collect();
    let captures = HEADING_PATTERN.captures(&text).ok().flatten()?;
    let run = captures.get(1)?;
    let title = captures.get(2)?;
    let start = text[..title.start()].chars().count();
    let end = start + title.as_str().chars().count();
    Some(HeadingShape {
        level: run.as_str().len() as u8,
        title: Span::new(start, end),
    })
}

/// Computes the section list of a root view: the lead first, then one
/// section per heading line, each running up to the next heading line of
/// any level.
pub(crate) fn sections(core: &ViewCore) -> Vec<Section> {
    let text = core.chars();

    let mut heads = Vec::new();
    let mut line_start = 0;
    while line_start < text.len() {
        let line_end = (line_start..text.len())
            .find(|&i| text[i] == '\n')
            .unwrap_or(text.len());
        if heading_shape(&text[line_start..line_end]).is_some() {
            heads.push(line_start);
        }
        line_start = line_end + 1;
    }

    let first = heads.first().copied().unwrap_or(text.len());
    let mut list = vec![Section::from_core(core.direct(Span::new(0, first)))];
    for (i, &at) in heads.iter().enumerate() {
        let end = heads.get(i + 1).copied().unwrap_or(text.len());
        list.push(Section::from_core(core.direct(Span::new(at, end))));
    }
    list
}

/// A section view: a heading line plus its contents, or the lead.
#[derive(Clone)]
pub struct Section {
    pub(crate) core: ViewCore,
}

impl Section {
    /// Parses `text` as the serialised form of a single section. A buffer
    /// that opens with a heading line is that heading's section; anything
    /// else reads as the lead.
    pub fn new(text: &str) -> Self {
        let root = ViewCore::new(ViewCore::parse(text), Anchor::Whole);
        let mut all = sections(&root);
        let pick = usize::from(all.len() > 1 && all[0].core.span().is_empty());
        all.remove(pick)
    }

    pub(crate) fn from_core(core: ViewCore) -> Self {
        Self { core }
    }

    /// The section level: 0 for the lead, otherwise 1 through 6.
    pub fn level(&self) -> u8 {
        self.heading().map_or(0, |(shape, _)| shape.level)
    }

    /// The heading title, `""` for the lead.
    pub fn title(&self) -> String {
        self.heading().map_or_else(String::new, |(shape, _)| {
            let text = self.core.chars();
            text[shape.title.into_range()].iter().collect()
        })
    }

    /// Replaces the heading title. The lead has no heading to rename, so
    /// renaming it fails.
    pub fn set_title(&mut self, title: &str) -> Result<(), LeadSectionError> {
        let Some((shape, _)) = self.heading() else {
            return Err(LeadSectionError);
        };
        self.core.splice_relative(shape.title, title);
        Ok(())
    }

    /// Everything after the heading line; the whole span for the lead.
    pub fn contents(&self) -> String {
        let text = self.core.chars();
        let skip = self.heading().map_or(0, |(_, skip)| skip);
        text[skip..].iter().collect()
    }

    /// Replaces the section contents, leaving the heading line untouched.
    pub fn set_contents(&mut self, contents: &str) {
        let len = self.core.chars().len();
        let skip = self.heading().map_or(0, |(_, skip)| skip);
        self.core.splice_relative(Span::new(skip, len), contents);
    }

    /// The heading shape of this section's first line, plus the length of
    /// the heading line including its terminator.
    fn heading(&self) -> Option<(HeadingShape, usize)> {
        let text = self.core.chars();
        let line_end = text
            .iter()
            .position(|&c| c == '\n')
            .unwrap_or(text.len());
        let shape = heading_shape(&text[..line_end])?;
        Some((shape, (line_end + 1).min(text.len())))
    }
}

view_common!(Section);
view_queries!(Section);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_six() {
        let s = Section::new("====== == ======\n");
        assert_eq!(s.level(), 6);
        assert_eq!(s.title(), " == ");
    }

    #[test]
    fn level_is_capped_at_six() {
        let s = Section::new("======= h6 =======\n");
        assert_eq!(s.level(), 6);
        assert_eq!(s.title(), "= h6 =");
    }

    #[test]
    fn unbalanced_equal_signs() {
        let s = Section::new("====== ==   \n");
        assert_eq!(s.level(), 2);
        assert_eq!(s.title(), "==== ");

        let s = Section::new("== ======   \n");
        assert_eq!(s.level(), 2);
        assert_eq!(s.title(), " ====");

        let s = Section::new("========  \n");
        assert_eq!(s.level(), 3);
        assert_eq!(s.title(), "==");
    }

    #[test]
    fn lead_section() {
        let s = Section::new("lead text. \n== section ==\ntext.");
        assert_eq!(s.level(), 0);
        assert_eq!(s.title(), "");
    }

    #[test]
    fn set_title() {
        let mut s = Section::new("== section ==\ntext.");
        s.set_title(" newtitle ").unwrap();
        assert_eq!(s.title(), " newtitle ");
        assert_eq!(s.string(), "== newtitle ==\ntext.");
    }

    #[test]
    fn lead_title_cannot_be_set() {
        let mut s = Section::new("lead text");
        assert!(s.set_title(" newtitle ").is_err());
    }

    #[test]
    fn set_contents() {
        let mut s = Section::new("== title ==\ntext.");
        s.set_contents(" newcontents ");
        assert_eq!(s.contents(), " newcontents ");
    }

    #[test]
    fn set_lead_contents() {
        let mut s = Section::new("lead");
        s.set_contents("newlead");
        assert_eq!(s.string(), "newlead");
    }

    #[test]
    fn not_headings() {
        assert!(heading_shape(&['=', '=']).is_none(), "no title, no heading");
        let line: Vec<char> = "text == x ==".chars().collect();
        assert!(heading_shape(&line).is_none());
        let line: Vec<char> = "== x".chars().collect();
        assert!(heading_shape(&line).is_none());
    }
}
