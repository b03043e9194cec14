//! Scanner configuration data.

use regex::Regex;
use std::sync::LazyLock;

/// Site specific configuration of a wiki.
#[derive(Debug)]
pub struct ConfigurationSource {
    /// Protocols that can open an external link, lowercased.
    ///
    /// Each entry is matched as a case-insensitive prefix of the link
    /// target, so the protocol-relative `//` belongs here too.
    pub protocols: &'static [&'static str],
}

/// Processed configuration data for the scanner.
#[derive(Debug)]
pub struct Configuration {
    /// A compiled pattern matching a bracketed external link,
    /// `[URL optional-text]`.
    pub(crate) bracketed_link_pattern: Regex,
    /// A compiled pattern matching a bare external link.
    pub(crate) bare_link_pattern: Regex,
    /// Configuration source.
    source: &'static ConfigurationSource,
}

impl core::ops::Deref for Configuration {
    type Target = ConfigurationSource;

    fn deref(&self) -> &Self::Target {
        self.source
    }
}

impl Configuration {
    /// Allocates and returns a new configuration based on the given site
    /// specific configuration.
    #[must_use]
    pub fn new(source: &'static ConfigurationSource) -> Self {
        let protocols = protocols_regex(source.protocols.iter().copied());
        let bracketed_link_pattern =
            Regex::new(&format!(r"\[(?i:{protocols})[^\s\]]*(?:\s[^\]]*)?\]")).unwrap();
        let bare_link_pattern =
            Regex::new(&format!(r"(?i:{protocols})[^\s\[\]<>|{{}}]+")).unwrap();

        Self {
            bracketed_link_pattern,
            bare_link_pattern,
            source,
        }
    }
}

/// The stock configuration source.
pub static DEFAULT_SOURCE: ConfigurationSource = ConfigurationSource {
    protocols: &["http://", "https://", "ftp://", "mailto:", "//"],
};

/// The process-wide default configuration.
pub(crate) static CONFIG: LazyLock<Configuration> =
    LazyLock::new(|| Configuration::new(&DEFAULT_SOURCE));

/// Converts a list of protocols into a regular expression alternates
/// subexpression.
fn protocols_regex<'a>(protocols: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for proto in protocols {
        if !out.is_empty() {
            out.push('|');
        }
        out += &regex::escape(proto);
    }
    out
}
