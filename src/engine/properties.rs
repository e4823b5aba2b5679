//! Property tests for matching and application.

use proptest::prelude::*;

use crate::engine::{CategoryTable, CompiledRule, RuleList};

const CATEGORIES: &str = "P = p t k\nN = m n ŋ\nV = a e i o u\n";

fn table() -> CategoryTable {
    RuleList::parse_str(CATEGORIES).unwrap().categories().clone()
}

fn arb_word() -> impl Strategy<Value = String> {
    "[ptkmnŋaeiou ]{0,12}"
}

fn arb_rule() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("a > e"),
        Just("{0:P} > {0:N}"),
        Just("{0:N} > 0 / _{0:P}"),
        Just("a > 0 ! _{0:P}{0:P}"),
        Just("0 > a / _#"),
        Just("{V} > 0 / {P}_{P}"),
        Just("{0:P}{1:V} > {1:V}{0:P}"),
        Just("{N}{V} > x / #_"),
    ]
}

proptest! {
    #[test]
    fn matches_are_sorted_and_disjoint(rule in arb_rule(), word in arb_word()) {
        let cr = CompiledRule::parse(rule, &table()).unwrap();
        let matches = cr.find(&word);
        for pair in matches.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
            prop_assert!(pair[0].start <= pair[1].start);
        }
        for m in &matches {
            prop_assert!(m.start <= m.end && m.end <= word.len());
            prop_assert!(word.is_char_boundary(m.start) && word.is_char_boundary(m.end));
        }
    }

    #[test]
    fn words_without_matches_are_unchanged(rule in arb_rule(), word in arb_word()) {
        let cr = CompiledRule::parse(rule, &table()).unwrap();
        if cr.find(&word).is_empty() {
            prop_assert_eq!(cr.apply(&word).unwrap().0, word);
        }
    }

    #[test]
    fn nasalisation_is_idempotent(word in arb_word()) {
        let list = RuleList::parse_str(&format!("{CATEGORIES}{{0:P}} > {{0:N}}")).unwrap();
        let (once, _) = list.apply(&word).unwrap();
        let (twice, _) = list.apply(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn trace_always_lists_every_entry(word in arb_word()) {
        let list = RuleList::parse_str(&format!("{CATEGORIES}// c\n{{0:N}} > 0 / _{{0:P}}")).unwrap();
        let (_, trace) = list.apply(&word).unwrap();
        prop_assert_eq!(trace.len(), list.len());
    }
}
