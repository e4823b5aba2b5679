//! Line-level syntax of the rule language.
//!
//! ```text
//! // comment
//! C = p t k {N}                          category definition
//! {0:P} > {0:N} / V_ ! #_                rule: from > to / before_after ! unbefore_unafter
//! ```
//!
//! This module only splits text; nothing here knows about regexes or live
//! categories. See `compiled_rule.rs` for turning a [`Rule`] into matchers.

use std::fmt;
use std::ops::Range;

use crate::error::{Error, Result};

pub(crate) const COMMENT: &str = "//";
pub(crate) const ARROW: &str = " > ";
pub(crate) const EQUALS: &str = " = ";

/// The `0` placeholder: empty target (insertion) or empty replacement (deletion).
pub(crate) const NOTHING: &str = "0";

/// A sound change rule as written, with category tokens left unexpanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rule {
    pub from: String,
    pub to: String,
    pub before: String,
    pub after: String,
    pub unbefore: String,
    pub unafter: String,
}

impl Rule {
    /// Parse `from > to`, optionally followed by ` / before_after` and ` ! unbefore_unafter`.
    ///
    /// ```
    /// use soundchange::Rule;
    ///
    /// let rule = Rule::parse("a > b / c_ ! _d").unwrap();
    /// assert_eq!(rule.before, "c");
    /// assert_eq!(rule.unafter, "d");
    /// ```
    pub fn parse(line: &str) -> Result<Rule> {
        let line = line.trim();
        let caps = regex!(r"^(\S*) > (\S*)(?: / ([^\s_]*)_([^\s_]*))?(?: ! ([^\s_]*)_([^\s_]*))?$")
            .captures(line)
            .ok_or_else(|| Error::MalformedRule { line: line.to_string() })?;
        let field = |i: usize| caps.get(i).map_or_else(String::new, |m| m.as_str().to_string());

        Ok(Rule { from: field(1), to: field(2), before: field(3), after: field(4), unbefore: field(5), unafter: field(6) })
    }

    /// True when the target is `0`, i.e. the rule inserts text.
    pub fn is_insertion(&self) -> bool {
        self.from == NOTHING
    }

    /// True when the replacement is `0`, i.e. the rule deletes text.
    pub fn is_deletion(&self) -> bool {
        self.to == NOTHING
    }
}

/// Canonical form: environments are only written when they are non-empty.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {}", self.from, self.to)?;
        if !self.before.is_empty() || !self.after.is_empty() {
            write!(f, " / {}_{}", self.before, self.after)?;
        }
        if !self.unbefore.is_empty() || !self.unafter.is_empty() {
            write!(f, " ! {}_{}", self.unbefore, self.unafter)?;
        }
        Ok(())
    }
}

/// A `{name}` or `{n:name}` token found in rule text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryToken<'t> {
    /// Byte range of the whole token, braces included.
    pub span: Range<usize>,
    pub number: Option<usize>,
    pub name: &'t str,
}

/// Category names start with a letter and never contain whitespace, braces or `:`.
pub(crate) fn is_category_name(name: &str) -> bool {
    regex!(r"^\p{L}[^{}\s:]*$").is_match(name)
}

/// Split a definition line into its name and right-hand side.
///
/// An empty category is written `E = `, which trimming turns into `E =`, so a
/// trailing ` =` also counts as a definition with no elements.
pub(crate) fn split_definition(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    line.split_once(EQUALS).or_else(|| line.strip_suffix(EQUALS.trim_end()).map(|name| (name, "")))
}

/// Find every category token in `text`, left to right.
///
/// `{2}` and `{2,3}` are left alone (they are regex repetitions), but a token
/// whose reference part is not a plain non-negative integer, such as `{x:P}`,
/// is a `MalformedReference`.
pub(crate) fn category_tokens(text: &str) -> Result<Vec<CategoryToken<'_>>> {
    category_tokens_outside(text, &[])
}

/// Like [`category_tokens`], but ignores anything starting inside one of the
/// `skip` byte ranges.
pub(crate) fn category_tokens_outside<'t>(text: &'t str, skip: &[Range<usize>]) -> Result<Vec<CategoryToken<'t>>> {
    let mut tokens = Vec::new();
    for caps in regex!(r"\{(?:([^:{}\s]*):)?(\p{L}[^{}\s:]*)\}").captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if skip.iter().any(|range| range.contains(&whole.start())) {
            continue;
        }
        let number = match caps.get(1) {
            None => None,
            Some(n) => Some(parse_reference(n.as_str()).ok_or_else(|| Error::MalformedReference {
                token: whole.as_str().to_string(),
            })?),
        };
        tokens.push(CategoryToken { span: whole.range(), number, name: name.as_str() });
    }
    Ok(tokens)
}

fn parse_reference(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
