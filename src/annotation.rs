//! `@tag argument` annotation parser — line-by-line scanner.
//!
//! Only the closed set of tags in [`AnnotationTag`] is kept; any other
//! `@word` line is dropped silently. Parsing never fails.

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use strum::{AsRefStr, Display, EnumIter, EnumString};

// `@tag` at the start of a (decoration-stripped) line, then optional text
static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z_][A-Za-z0-9_]*)(?:[[:space:]]+(.*))?$").unwrap());

/// Comment leaders stripped before a line is matched. Longest first.
const LEADERS: &[&str] = &["/**", "/*", "///", "//!", "//", "*"];

/// Annotation tags recognized in model documentation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter, Serialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum AnnotationTag {
    /// Root element name of a model type.
    XmlRoot,
    /// Character encoding of a model type's document.
    XmlEncoding,
    /// External field name; wins over `@alias`.
    Name,
    Alias,
    /// Documented type, e.g. `string[]|null`.
    Var,
    /// Required, optionally only within the named context.
    Required,
    Attribute,
    /// Validation directive, e.g. `length(1, 20)`.
    Rule,
}

/// Ordered multimap of annotation tag → raw argument strings.
///
/// One entry per occurrence; a bare `@required` yields `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnnotationTable {
    entries: IndexMap<AnnotationTag, Vec<String>>,
}

impl AnnotationTable {
    pub fn has(&self, tag: AnnotationTag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// All arguments for `tag` in encounter order; empty if absent.
    pub fn get(&self, tag: AnnotationTag) -> &[String] {
        self.entries.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Argument of the first occurrence of `tag`, if any.
    pub fn first(&self, tag: AnnotationTag) -> Option<&str> {
        self.get(tag).first().map(String::as_str)
    }

    /// First argument of `tag`, treating an empty argument as absent.
    pub fn first_non_empty(&self, tag: AnnotationTag) -> Option<&str> {
        self.first(tag).filter(|arg| !arg.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags present, in the order they were first seen.
    pub fn tags(&self) -> impl Iterator<Item = AnnotationTag> + '_ {
        self.entries.keys().copied()
    }

    fn push(&mut self, tag: AnnotationTag, arg: String) {
        self.entries.entry(tag).or_default().push(arg);
    }
}

/// Parse a documentation string into an [`AnnotationTable`].
///
/// Accepts `/** ... */` blocks as well as `///` and `//!` comment runs.
/// `None` (an undocumented item) gives an empty table.
pub fn parse<'a>(doc: impl Into<Option<&'a str>>) -> AnnotationTable {
    let mut table = AnnotationTable::default();
    let Some(doc) = doc.into() else {
        return table;
    };

    for line in doc.lines() {
        let line = strip_decoration(line);
        let Some(caps) = RE_TAG.captures(line) else {
            continue;
        };
        let Ok(tag) = caps[1].parse::<AnnotationTag>() else {
            continue;
        };
        let arg = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        table.push(tag, arg.to_string());
    }

    table
}

fn strip_decoration(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_suffix("*/").unwrap_or(line).trim_end();
    LEADERS
        .iter()
        .find_map(|leader| line.strip_prefix(leader))
        .unwrap_or(line)
        .trim_start()
}
