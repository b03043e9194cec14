//! Structural wikitext parsing with live, mutable views over a shared
//! buffer.
//!
//! [`WikiText::new`] scans its input for templates, triple-brace
//! parameters, parser functions, wikilinks, external links, comments, and
//! nowiki regions, and records each as a span over a single shared buffer.
//! The views handed out by the collection accessors are live handles:
//! editing one view splices the buffer and shifts every other view's span,
//! so all handles keep pointing at their own construct. No rendering or
//! link resolution happens here; this crate only models the structure of
//! the markup.
//!
//! ```
//! use wikitext_edit::WikiText;
//!
//! let wt = WikiText::new("{{cite|title=Example|url=https://example.org}}");
//! let template = wt.templates().remove(0);
//! assert_eq!(template.name(), "cite");
//! assert_eq!(template.arguments()[0].name(), "title");
//! assert_eq!(wt.string(), wt.to_string());
//! ```
//!
//! Each construct also has a standalone entry point ([`Template::new`],
//! [`Section::new`], …) that treats its input as the serialised form of
//! that single construct.

mod cell;
mod comment;
mod config;
mod document;
mod index;
mod link;
mod parameter;
mod scanner;
mod section;
mod template;
#[cfg(test)]
mod tests;
mod textmap;
mod view;
mod wikitext;

pub use cell::Cell;
pub use comment::Comment;
pub use config::{Configuration, ConfigurationSource, DEFAULT_SOURCE};
pub use index::SpanKind;
pub use link::{ExternalLink, WikiLink};
pub use parameter::Parameter;
pub use section::{LeadSectionError, Section};
pub use template::{Argument, ParserFunction, Template};
pub use textmap::Span;
pub use wikitext::WikiText;
