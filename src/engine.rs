//! Rule compilation and matching engine.
//!
//! The engine is split into focused submodules under `src/engine/`. Public
//! paths stay flat (`crate::engine::RuleList`, `crate::engine::CompiledRule`).
//!
//! ## How the parts work together
//!
//! ```text
//! source line ── RuleList::parse_line ─────────────────── (rule_list.rs)
//!                 │
//!                 ├─ `//…`    -> Entry::Comment
//!                 ├─ `A = …`  -> CategoryTable::parse_definition (category.rs)
//!                 └─ `… > …`  -> Rule::parse                      (syntax.rs)
//!                                  │
//!                                  v
//!                             CompiledRule::compile           (compiled_rule.rs)
//!                               - one regex per fragment
//!                               - capture slot -> (number, category)
//!                               - replacement template          (apply.rs)
//!
//! word ── RuleList::apply ── for each entry:
//!                              CompiledRule::find              (matcher.rs)
//!                                - target candidates
//!                                - thread bindings through before/after
//!                                - reject on unbefore/unafter
//!                              CompiledRule::splice            (apply.rs)
//!                               │
//!                               v
//!                         (word, trace)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `syntax.rs`: the line grammar, rule text, category token scanning.
//! - `category.rs`: `Category` (elements, indices, match form) and the
//!   insertion-ordered `CategoryTable`.
//! - `compiled_rule.rs`: expands category tokens and rewrites user syntax
//!   into the five fragment regexes.
//! - `matcher.rs`: finds valid, non-overlapping matches and their bindings.
//! - `apply.rs`: renders the replacement and splices it into the word.
//! - `rule_list.rs`: sequencing of comments, categories and rules.
//!
//! ## Debugging
//!
//! Compilation logs each rule's regexes at `debug`. Rejected candidates and
//! the fragment that rejected them are logged at `trace`, so
//! `RUST_LOG=soundchange=trace` shows why a rule did not fire.

#[path = "engine/apply.rs"]
mod apply;
#[path = "engine/category.rs"]
mod category;
#[path = "engine/compiled_rule.rs"]
mod compiled_rule;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/rule_list.rs"]
mod rule_list;
#[path = "engine/syntax.rs"]
mod syntax;

#[cfg(test)]
#[path = "engine/properties.rs"]
mod properties;

pub use category::{Category, CategoryTable};
pub use compiled_rule::CompiledRule;
pub use rule_list::{Entry, RuleList};
pub use syntax::Rule;
