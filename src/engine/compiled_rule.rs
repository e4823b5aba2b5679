//! Rule compilation.
//!
//! A [`Rule`] is plain text. Compiling it against a [`CategoryTable`] binds
//! every category token to a live [`Category`] and produces one regex per
//! fragment:
//!
//! ```text
//! from      {0:N}          ->  (ŋ|m|n)                refs: [(0, N)]
//! before    #{C}           ->  (?:(?:^|\s)(?:…))$      refs: []
//! after     {0:P}          ->  ^(?:(p|t|k))            refs: [(0, P)]
//! unbefore  (empty)        ->  None
//! unafter   {1:P}          ->  ^(?:(p|t|k))            refs: [(1, P)]
//! ```
//!
//! Each fragment is rewritten in this order:
//!
//! 1. user-written groups become non-capturing, so that capture slots belong
//!    exclusively to numbered category references;
//! 2. `#` becomes a word-boundary pattern suited to the fragment's side;
//! 3. category tokens expand to alternations (capturing when numbered);
//! 4. before-side fragments are anchored to the end of the haystack and
//!    after-side fragments to its start.
//!
//! Inside a bracketed class everything is literal: `[{P}#]` matches `{`, `P`,
//! `}` or `#`, and no category is expanded there.
//!
//! Inline flags such as `(?i)` or `(?i:…)` are rejected. A numbered reference
//! binds by looking its capture up among the category's elements, so a
//! capture that only matches case-insensitively could never bind.
//!
//! ## Invariants
//!
//! - `CompiledPattern::refs[i]` describes capture group `i + 1`. Compilation
//!   fails if the regex reports a different number of groups.
//! - A compiled rule never consults the category table again. Later
//!   definitions cannot change what it matches or produces.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use log::debug;
use regex::{Captures, Regex};

use super::apply::Replacement;
use super::category::{Category, CategoryTable};
use super::syntax::{self, Rule};
use crate::Bindings;
use crate::error::{Error, Result};

/// Which part of a rule a pattern was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fragment {
    From,
    Before,
    After,
    UnBefore,
    UnAfter,
}

impl Fragment {
    /// Replacement for `#`.
    fn boundary(self) -> &'static str {
        match self {
            Fragment::From => r"(?:^|\s|$)",
            Fragment::Before | Fragment::UnBefore => r"(?:^|\s)",
            Fragment::After | Fragment::UnAfter => r"(?:\s|$)",
        }
    }

    fn anchor(self, body: &str) -> String {
        match self {
            Fragment::From => body.to_string(),
            Fragment::Before | Fragment::UnBefore => format!("(?:{body})$"),
            Fragment::After | Fragment::UnAfter => format!("^(?:{body})"),
        }
    }
}

/// A numbered category reference occupying one capture group.
#[derive(Debug, Clone)]
pub(crate) struct NumberedRef {
    pub number: usize,
    pub category: Arc<Category>,
}

/// One fragment's regex plus the reference table for its capture groups.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    pub regex: Regex,
    pub refs: Vec<NumberedRef>,
}

impl CompiledPattern {
    pub(crate) fn compile(text: &str, fragment: Fragment, categories: &CategoryTable) -> Result<Self> {
        let mut body = String::with_capacity(text.len() * 2);
        let mut refs = Vec::new();
        let mut last = 0;

        for token in syntax::category_tokens_outside(text, &class_ranges(text))? {
            body.push_str(&rewrite_syntax(&text[last..token.span.start], fragment.boundary())?);
            let category = categories.lookup(token.name)?;
            match token.number {
                Some(number) => {
                    body.push('(');
                    refs.push(NumberedRef { number, category: Arc::clone(category) });
                }
                None => body.push_str("(?:"),
            }
            body.push_str(category.pattern());
            body.push(')');
            last = token.span.end;
        }
        body.push_str(&rewrite_syntax(&text[last..], fragment.boundary())?);

        let source = fragment.anchor(&body);
        let regex = Regex::new(&source)
            .map_err(|err| Error::InternalCompileError { pattern: source.clone(), message: err.to_string() })?;
        if regex.captures_len() != refs.len() + 1 {
            return Err(Error::InternalCompileError {
                pattern: source,
                message: format!(
                    "{} capture groups for {} numbered references",
                    regex.captures_len() - 1,
                    refs.len()
                ),
            });
        }

        Ok(CompiledPattern { regex, refs })
    }

    /// Record the element index captured by each numbered reference.
    ///
    /// Returns `false` when a number is already bound to a different index.
    /// Groups that did not take part in the match bind nothing.
    pub(crate) fn bind(&self, caps: &Captures<'_>, bindings: &mut Bindings) -> bool {
        for (slot, r) in self.refs.iter().enumerate() {
            let Some(m) = caps.get(slot + 1) else {
                continue;
            };
            let Some(index) = r.category.index_of(m.as_str()) else {
                return false;
            };
            match bindings.get(&r.number) {
                Some(&bound) if bound != index => return false,
                Some(_) => {}
                None => {
                    bindings.insert(r.number, index);
                }
            }
        }
        true
    }

    /// Match against `haystack` and extend `bindings` with the result.
    ///
    /// `None` when the pattern does not match or its captures disagree with
    /// the bindings already made.
    pub(crate) fn match_bound(&self, haystack: &str, mut bindings: Bindings) -> Option<Bindings> {
        let caps = self.regex.captures(haystack)?;
        self.bind(&caps, &mut bindings).then_some(bindings)
    }

    /// Whether the pattern matches consistently with `bindings`, without
    /// keeping anything it binds.
    pub(crate) fn matches_bound(&self, haystack: &str, bindings: &Bindings) -> bool {
        self.match_bound(haystack, bindings.clone()).is_some()
    }

    pub(crate) fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// A rule whose fragments have been compiled against a category table.
///
/// Cheap to share: everything inside is immutable, so a compiled rule can be
/// applied from several threads at once.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub(crate) rule: Rule,
    pub(crate) from: CompiledPattern,
    pub(crate) before: CompiledPattern,
    pub(crate) after: CompiledPattern,
    pub(crate) unbefore: Option<CompiledPattern>,
    pub(crate) unafter: Option<CompiledPattern>,
    pub(crate) replacement: Replacement,
}

impl CompiledRule {
    /// Compile `rule` against the categories defined so far.
    pub fn compile(rule: &Rule, categories: &CategoryTable) -> Result<Self> {
        let from_text = if rule.is_insertion() { "" } else { rule.from.as_str() };
        let from = CompiledPattern::compile(from_text, Fragment::From, categories)?;
        let before = CompiledPattern::compile(&rule.before, Fragment::Before, categories)?;
        let after = CompiledPattern::compile(&rule.after, Fragment::After, categories)?;
        let unbefore = optional(&rule.unbefore, Fragment::UnBefore, categories)?;
        let unafter = optional(&rule.unafter, Fragment::UnAfter, categories)?;
        let replacement =
            if rule.is_deletion() { Replacement::default() } else { Replacement::parse(&rule.to, categories)? };

        debug!(
            "[rule:compiled] rule=\"{}\" from=/{}/ before=/{}/ after=/{}/",
            rule,
            from.as_str(),
            before.as_str(),
            after.as_str()
        );

        Ok(CompiledRule { rule: rule.clone(), from, before, after, unbefore, unafter, replacement })
    }

    /// Parse and compile a single rule line.
    pub fn parse(line: &str, categories: &CategoryTable) -> Result<Self> {
        Self::compile(&Rule::parse(line)?, categories)
    }

    /// The rule this was compiled from.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }
}

impl fmt::Display for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.rule.fmt(f)
    }
}

fn optional(text: &str, fragment: Fragment, categories: &CategoryTable) -> Result<Option<CompiledPattern>> {
    if text.is_empty() { Ok(None) } else { CompiledPattern::compile(text, fragment, categories).map(Some) }
}

/// Byte ranges of the bracketed classes in `text`, brackets included.
///
/// Follows the same rules as [`rewrite_syntax`]: escapes are skipped, a
/// leading `^` or `]` belongs to the class, and classes may nest.
fn class_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut depth = 0usize;
    let mut start = 0;

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' => {
                if depth == 0 {
                    start = idx;
                    chars.next_if(|&(_, c)| c == '^');
                    chars.next_if(|&(_, c)| c == ']');
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    ranges.push(start..idx + 1);
                }
            }
            _ => {}
        }
    }
    if depth > 0 {
        // Unterminated: the regex compiler reports it.
        ranges.push(start..text.len());
    }
    ranges
}

/// Make every user-written group non-capturing and replace `#` with `boundary`.
///
/// Escapes are copied through untouched, and so is anything inside a
/// bracketed character class, where `(` and `#` are literals.
fn rewrite_syntax(text: &str, boundary: &str) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut class_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                out.push(c);
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                    i += 1;
                }
            }
            '[' => {
                out.push(c);
                if class_depth == 0 {
                    // A leading `^` and a leading `]` are part of the class.
                    if chars.get(i + 1) == Some(&'^') {
                        out.push('^');
                        i += 1;
                    }
                    if chars.get(i + 1) == Some(&']') {
                        out.push(']');
                        i += 1;
                    }
                }
                class_depth += 1;
            }
            ']' if class_depth > 0 => {
                out.push(c);
                class_depth -= 1;
            }
            _ if class_depth > 0 => out.push(c),
            '#' => out.push_str(boundary),
            '(' => {
                i = rewrite_group_opening(&chars, i, &mut out)
                    .ok_or_else(|| Error::InlineFlags { fragment: text.to_string() })?;
            }
            _ => out.push(c),
        }
        i += 1;
    }
    Ok(out)
}

/// Rewrite the group opening at `chars[i]` and return the index of the last
/// character consumed, or `None` for a flag group.
fn rewrite_group_opening(chars: &[char], i: usize, out: &mut String) -> Option<usize> {
    if chars.get(i + 1) != Some(&'?') {
        out.push_str("(?:");
        return Some(i);
    }
    // Named groups capture: `(?P<name>` and `(?<name>` lose their name.
    let name_start = match (chars.get(i + 2), chars.get(i + 3)) {
        (Some(':'), _) => {
            out.push('(');
            return Some(i);
        }
        (Some('P'), Some('<')) => i + 4,
        (Some('<'), _) => i + 3,
        _ => return None,
    };
    let close = chars[name_start..].iter().position(|&c| c == '>').map(|off| name_start + off);
    match close {
        Some(close) => {
            out.push_str("(?:");
            Some(close)
        }
        // Unterminated name: leave it for the regex compiler to reject.
        None => {
            out.push('(');
            Some(i)
        }
    }
}
