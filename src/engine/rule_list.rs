//! Ordered rule sources.
//!
//! A `RuleList` is built one line at a time. Categories accumulate in the
//! list's own table as definitions are read, so a rule only ever sees the
//! categories declared above it:
//!
//! ```text
//! P = p t k            Entry::Category   table: {P}
//! {0:P} > {0:N}        error: N undefined
//! N = m n ŋ            Entry::Category   table: {P, N}
//! {0:P} > {0:N}        Entry::Rule       compiled against {P, N}
//! ```
//!
//! Applying the list threads the word through every entry in order. Each
//! entry also adds one line to the trace, whether or not it changed the word.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;

use super::category::{Category, CategoryTable};
use super::compiled_rule::CompiledRule;
use super::syntax::{ARROW, COMMENT, Rule, split_definition};
use crate::error::{Error, Result};

/// One parsed line of a rule source.
#[derive(Debug, Clone)]
pub enum Entry {
    Category(Arc<Category>),
    Rule(CompiledRule),
    Comment(String),
}

impl Entry {
    /// Run this entry against `word`, returning the new word and its trace line.
    pub fn contribute(&self, word: String) -> Result<(String, String)> {
        match self {
            Entry::Category(category) => Ok((word, category.to_string())),
            Entry::Comment(text) => Ok((word, text.clone())),
            Entry::Rule(rule) => rule.apply(&word),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Category(category) => category.fmt(f),
            Entry::Rule(rule) => rule.fmt(f),
            Entry::Comment(text) => f.write_str(text),
        }
    }
}

/// An ordered list of categories, rules and comments.
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    categories: CategoryTable,
    entries: Vec<Entry>,
}

impl RuleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole source, one entry per non-blank line.
    ///
    /// Errors carry the 1-based line number they occurred on.
    pub fn parse_str(text: &str) -> Result<Self> {
        let mut list = RuleList::new();
        for (idx, line) in text.lines().enumerate() {
            list.parse_line(line).map_err(|err| err.at_line(idx + 1))?;
        }
        debug!("[list:parsed] entries={} categories={}", list.entries.len(), list.categories.len());
        Ok(list)
    }

    /// Parse one line and append it to the list.
    ///
    /// Blank lines are ignored. A line that fails to parse leaves the list
    /// unchanged.
    pub fn parse_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let entry = if line.starts_with(COMMENT) {
            Entry::Comment(line.to_string())
        } else if line.contains(ARROW) {
            Entry::Rule(CompiledRule::parse(line, &self.categories)?)
        } else if split_definition(line).is_some() {
            let category = self.categories.parse_definition(line)?;
            Entry::Category(self.categories.insert(category)?)
        } else {
            return Err(Error::MalformedLine { line: line.to_string() });
        };

        self.entries.push(entry);
        Ok(())
    }

    /// Compile `rule` against the categories defined so far and append it.
    pub fn push_rule(&mut self, rule: &Rule) -> Result<()> {
        let compiled = CompiledRule::compile(rule, &self.categories)?;
        self.entries.push(Entry::Rule(compiled));
        Ok(())
    }

    /// Apply every entry to `word` in order.
    ///
    /// The first error aborts the whole run; no partial output is returned.
    pub fn apply(&self, word: &str) -> Result<(String, Vec<String>)> {
        let mut word = word.to_string();
        let mut trace = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let (next, line) = entry.contribute(word)?;
            word = next;
            trace.push(line);
        }
        Ok((word, trace))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for RuleList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RuleList::parse_str(s)
    }
}

/// Writes one entry per line, in canonical form.
impl fmt::Display for RuleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_lines() {
        let list: RuleList = "// header\n\nP = p t k\n   \nN = m n ŋ\n{0:P} > {0:N}\n".parse().unwrap();
        let kinds: Vec<&str> = list
            .entries()
            .iter()
            .map(|e| match e {
                Entry::Category(_) => "category",
                Entry::Rule(_) => "rule",
                Entry::Comment(_) => "comment",
            })
            .collect();
        assert_eq!(kinds, ["comment", "category", "category", "rule"]);
        assert_eq!(list.categories().len(), 2);
    }

    #[test]
    fn empty_category_definition() {
        let list = RuleList::parse_str("E = \nE2 =\n{0:E} > x").unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.categories().get("E").unwrap().is_empty());
        let (word, trace) = list.apply("abc").unwrap();
        assert_eq!(word, "abc");
        assert_eq!(trace, ["E = ", "E2 = ", "{0:E} > x"]);
    }

    #[test]
    fn trace_has_one_line_per_entry() {
        let list = RuleList::parse_str("// nasalise\nP = p t k\nN = m n ŋ\n{0:P} > {0:N}").unwrap();
        let (word, trace) = list.apply("ta").unwrap();
        assert_eq!(word, "na");
        assert_eq!(trace, ["// nasalise", "P = p t k", "N = m n ŋ", "{0:P} > {0:N}"]);
    }

    #[test]
    fn rules_see_only_earlier_categories() {
        let err = RuleList::parse_str("P = p t k\n{0:P} > {0:N}\nN = m n ŋ").unwrap_err();
        assert!(matches!(err, Error::Line { line: 2, .. }));
        assert!(matches!(err.root(), Error::UndefinedCategory { name } if name == "N"));
    }

    #[test]
    fn malformed_line_is_reported_with_its_number() {
        let err = RuleList::parse_str("P = p t k\n\nnonsense").unwrap_err();
        assert_eq!(err.to_string(), "line 3: parse error: `nonsense` is not a valid rule or category");
    }

    #[test]
    fn failed_line_leaves_list_unchanged() {
        let mut list = RuleList::parse_str("P = p t k").unwrap();
        assert!(list.parse_line("P = b d g").is_err());
        assert!(list.parse_line("{Q} > a").is_err());
        assert_eq!(list.len(), 1);
        assert_eq!(list.categories().get("P").unwrap().elements(), ["p", "t", "k"]);
    }

    #[test]
    fn rules_run_in_order() {
        let list = RuleList::parse_str("a > b\nb > c").unwrap();
        assert_eq!(list.apply("ab").unwrap().0, "cc");
        let list = RuleList::parse_str("b > c\na > b").unwrap();
        assert_eq!(list.apply("ab").unwrap().0, "bc");
    }

    #[test]
    fn apply_error_discards_partial_output() {
        let list = RuleList::parse_str("N = m n\na > b\nb > {N}").unwrap();
        let err = list.apply("a").unwrap_err();
        assert!(matches!(err, Error::UnnumberedReplacementCategory { .. }));
        // Words the failing rule never fires on still go through.
        assert_eq!(list.apply("x").unwrap().0, "x");
    }

    #[test]
    fn push_rule_compiles_against_current_table() {
        let mut list = RuleList::parse_str("P = p t k\nN = m n ŋ").unwrap();
        list.push_rule(&Rule::parse("{0:P} > {0:N} / _#").unwrap()).unwrap();
        assert_eq!(list.apply("tat").unwrap().0, "tan");
    }

    #[test]
    fn display_writes_canonical_lines() {
        let list = RuleList::parse_str("// c\nV =  a   e\na > b / V_").unwrap();
        assert_eq!(list.to_string(), "// c\nV = a e\na > b / V_\n");
    }

    #[test]
    fn environment_spacing_is_strict() {
        let err = RuleList::parse_str("// c\na > b /  _").unwrap_err();
        assert!(matches!(err, Error::Line { line: 2, .. }));
        assert!(matches!(err.root(), Error::MalformedRule { .. }));
    }
}
