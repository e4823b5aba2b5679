//! Finding the places where a compiled rule applies.
//!
//! Target and environments are compiled as separate regexes, so a numbered
//! category cannot be tied across them with native backreferences. Instead a
//! single binding map (reference number -> element index) is threaded through
//! the fragments in a fixed order:
//!
//! ```text
//! from ──bind──> before ──bind──> after ──check──> unbefore ──check──> unafter
//!   │              │                │                 │                   │
//!   └─ conflict, no match, or a forbidden environment matching rejects the span
//! ```
//!
//! The negative environments only read the bindings. Anything they bind is
//! used to decide whether they match and then discarded.

use log::trace;

use super::compiled_rule::CompiledRule;
use crate::{Bindings, Match};

impl CompiledRule {
    /// All places where the rule applies to `word`, left to right.
    ///
    /// Candidates are the leftmost, non-overlapping matches of the target, so
    /// the result is sorted by `start` and no two matches overlap.
    pub fn find(&self, word: &str) -> Vec<Match> {
        let mut matches = Vec::new();

        for caps in self.from.regex.captures_iter(word) {
            let Some(span) = caps.get(0) else {
                continue;
            };
            let (start, end) = (span.start(), span.end());

            let mut bindings = Bindings::new();
            if !self.from.bind(&caps, &mut bindings) {
                self.reject(start, end, "target references disagree");
                continue;
            }
            let Some(bindings) = self.before.match_bound(&word[..start], bindings) else {
                self.reject(start, end, "before");
                continue;
            };
            let Some(bindings) = self.after.match_bound(&word[end..], bindings) else {
                self.reject(start, end, "after");
                continue;
            };
            if self.unbefore.as_ref().is_some_and(|p| p.matches_bound(&word[..start], &bindings)) {
                self.reject(start, end, "unbefore");
                continue;
            }
            if self.unafter.as_ref().is_some_and(|p| p.matches_bound(&word[end..], &bindings)) {
                self.reject(start, end, "unafter");
                continue;
            }

            matches.push(Match { start, end, bindings });
        }

        matches
    }

    fn reject(&self, start: usize, end: usize, reason: &str) {
        trace!("[rule:reject] rule=\"{}\" span={}..{} reason={}", self.rule, start, end, reason);
    }
}
