//! Splicing replacements into a word.
//!
//! The `to` side of a rule is split once, at compile time, into literal runs
//! and category references. Applying a rule renders that template for every
//! match and stitches the pieces back together:
//!
//! ```text
//! {0:N} > 0 / _{0:P}  on  "mtnt"
//!
//! matches:  [2..3, {0: 1}]
//! output:   "mt" + "" + "t"  =  "mtt"
//!            │     │     └ suffix after the last match
//!            │     └ rendered replacement
//!            └ prefix before the first match
//! ```

use std::sync::Arc;

use super::category::{Category, CategoryTable};
use super::compiled_rule::CompiledRule;
use super::syntax;
use crate::error::{Error, Result};
use crate::{Bindings, Match};

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Numbered { number: usize, category: Arc<Category> },
    // Kept so the error surfaces when the rule actually fires.
    Unnumbered { name: String },
}

/// The compiled `to` side of a rule.
#[derive(Debug, Clone, Default)]
pub(crate) struct Replacement {
    segments: Vec<Segment>,
}

impl Replacement {
    pub(crate) fn parse(to: &str, categories: &CategoryTable) -> Result<Self> {
        let mut segments = Vec::new();
        let mut last = 0;
        for token in syntax::category_tokens(to)? {
            if token.span.start > last {
                segments.push(Segment::Literal(to[last..token.span.start].to_string()));
            }
            let category = categories.lookup(token.name)?;
            segments.push(match token.number {
                Some(number) => Segment::Numbered { number, category: Arc::clone(category) },
                None => Segment::Unnumbered { name: token.name.to_string() },
            });
            last = token.span.end;
        }
        if last < to.len() {
            segments.push(Segment::Literal(to[last..].to_string()));
        }

        Ok(Replacement { segments })
    }

    /// Render the replacement for one match.
    pub(crate) fn render(&self, bindings: &Bindings) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Numbered { number, category } => {
                    let index = *bindings.get(number).ok_or_else(|| Error::UnboundReplacementReference {
                        number: *number,
                        name: category.name().to_string(),
                    })?;
                    let element = category
                        .get(index)
                        .ok_or_else(|| Error::InvalidReplacementIndex { index, name: category.name().to_string() })?;
                    out.push_str(element);
                }
                Segment::Unnumbered { name } => {
                    return Err(Error::UnnumberedReplacementCategory { name: name.clone() });
                }
            }
        }
        Ok(out)
    }
}

impl CompiledRule {
    /// Apply the rule to `word`, returning the new word and the rule's
    /// canonical text for the trace.
    ///
    /// A word the rule does not match is returned unchanged.
    pub fn apply(&self, word: &str) -> Result<(String, String)> {
        let matches = self.find(word);
        let output = self.splice(word, &matches)?;
        if !matches.is_empty() {
            log::debug!("[rule:applied] rule=\"{}\" matches={} \"{}\" -> \"{}\"", self.rule, matches.len(), word, output);
        }
        Ok((output, self.rule.to_string()))
    }

    /// Build the output word from `matches`, which must be sorted and
    /// non-overlapping (as returned by [`find`](Self::find)).
    pub fn splice(&self, word: &str, matches: &[Match]) -> Result<String> {
        let mut out = String::with_capacity(word.len());
        let mut last = 0;
        for m in matches {
            out.push_str(&word[last..m.start]);
            out.push_str(&self.replacement.render(&m.bindings)?);
            last = m.end;
        }
        out.push_str(&word[last..]);
        Ok(out)
    }
}
