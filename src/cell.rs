//! Table cell views.
//!
//! Tables as a whole are not modelled; a cell is a lightweight standalone
//! view over its own serialised form.

use crate::{
    scanner::{starts_with, top_level_indices},
    textmap::Span,
    view::{Anchor, ViewCore, view_common, view_queries},
};
use indexmap::IndexMap;
use std::sync::LazyLock;

/// One `name=value` pair of a cell attribute segment. Values may be
/// double-quoted, single-quoted, or bare.
static ATTR_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"([^\s=]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|(\S+))"#).unwrap()
});

/// A table cell view, e.g. `\n| a ` or `!! style="…" | a`.
#[derive(Clone)]
pub struct Cell {
    pub(crate) core: ViewCore,
}

impl Cell {
    /// Parses `text` as the serialised form of a single table cell.
    pub fn new(text: &str) -> Self {
        Self {
            core: ViewCore::new(ViewCore::parse(text), Anchor::Whole),
        }
    }

    /// The cell payload: everything after the cell marker and the
    /// attribute segment.
    pub fn value(&self) -> String {
        let text = self.core.chars();
        let shape = shape(&text);
        text[shape.value.into_range()].iter().collect()
    }

    /// Replaces the cell payload.
    pub fn set_value(&mut self, value: &str) {
        let text = self.core.chars();
        self.core.splice_relative(shape(&text).value, value);
    }

    /// The cell attributes, in source order. Empty when the cell has no
    /// attribute segment.
    pub fn attrs(&self) -> IndexMap<String, String> {
        let text = self.core.chars();
        let Some(attrs) = shape(&text).attrs else {
            return IndexMap::new();
        };
        let segment: String = text[attrs.into_range()].iter().collect();
        ATTR_PATTERN
            .captures_iter(&segment)
            .map(|captures| {
                let name = captures.get(1).map_or("", |m| m.as_str());
                let value = captures
                    .get(2)
                    .or_else(|| captures.get(3))
                    .or_else(|| captures.get(4))
                    .map_or("", |m| m.as_str());
                (name.to_string(), value.to_string())
            })
            .collect()
    }
}

view_common!(Cell);
view_queries!(Cell);

/// The decomposition of a cell's text.
struct CellShape {
    /// Bounds of the attribute segment, when one is present.
    attrs: Option<Span>,

    /// Bounds of the payload.
    value: Span,
}

/// Splits a cell into marker, optional attribute segment, and payload.
fn shape(text: &[char]) -> CellShape {
    let mut at = 0;
    while at < text.len() && text[at].is_whitespace() {
        at += 1;
    }
    for marker in ["!!", "||", "!", "|"] {
        if starts_with(text, at, marker) {
            at += marker.chars().count();
            break;
        }
    }

    let rest = &text[at.min(text.len())..];
    match top_level_indices(rest, '|').first() {
        Some(&pipe) => CellShape {
            attrs: Some(Span::new(at, at + pipe)),
            value: Span::new(at + pipe + 1, text.len()),
        },
        None => CellShape {
            attrs: None,
            value: Span::new(at.min(text.len()), text.len()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basics() {
        let c = Cell::new("\n| a ");
        assert_eq!(c.value(), " a ");
        assert_eq!(format!("{c:?}"), "Cell(\"\\n| a \")");
        assert!(c.attrs().is_empty());
    }

    #[test]
    fn attribute_segment() {
        let c = Cell::new("\n| style=\"text-align:right;\" | 12,333.00");
        assert_eq!(c.value(), " 12,333.00");
        let attrs = c.attrs();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["style"], "text-align:right;");
    }

    #[test]
    fn header_cell() {
        let c = Cell::new("!! colspan=2 | Shopping");
        assert_eq!(c.value(), " Shopping");
        assert_eq!(c.attrs()["colspan"], "2");
    }

    #[test]
    fn set_value() {
        let mut c = Cell::new("\n| a ");
        c.set_value(" b ");
        assert_eq!(c.string(), "\n| b ");
    }
}
