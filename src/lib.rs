//! Ordered, context-sensitive sound changes.
//!
//! A rule source declares categories of symbols and rewrite rules of the form
//! `from > to / before_after ! unbefore_unafter`. Rules are applied in order
//! to a word; numbered category references (`{0:P}`) tie the element chosen
//! in one place to the element used in another.
//!
//! ```
//! use soundchange::RuleList;
//!
//! let rules: RuleList = "P = p t k\nN = m n ŋ\n{0:N} > 0 / _{0:P}".parse().unwrap();
//! let (word, _trace) = rules.apply("mtnt").unwrap();
//! assert_eq!(word, "mtt");
//! ```
//!
//! Files of rules can be loaded and cached with [`RuleCache`], and chained
//! in stages with [`expand_pairs`].

use std::collections::BTreeMap;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod files;

pub use api::{Evolution, evolve, evolve_with};
pub use engine::{Category, CategoryTable, CompiledRule, Entry, Rule, RuleList};
pub use error::{Error, Result};
pub use files::{RuleCache, expand_pairs, load_file};

/// Reference number -> index of the element it matched.
pub type Bindings = BTreeMap<usize, usize>;

/// One place where a rule applies.
///
/// `start`/`end` are byte offsets of the target span in the word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Start byte index of the target (inclusive).
    pub start: usize,
    /// End byte index of the target (exclusive).
    pub end: usize,
    /// Element indices chosen by the numbered references of this match.
    pub bindings: Bindings,
}
