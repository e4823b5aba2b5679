use std::time::{Duration, Instant};

use crate::engine::RuleList;
use crate::error::Result;

/// Result from [`evolve`] and [`evolve_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evolution {
    /// The word as given.
    pub input: String,
    /// The word after every rule was applied.
    pub output: String,
    /// One line per entry of the rule list, in order.
    pub trace: Vec<String>,
    /// Time spent applying the rules (parsing excluded).
    pub elapsed: Duration,
}

impl Evolution {
    /// True when no rule changed the word.
    pub fn is_unchanged(&self) -> bool {
        self.input == self.output
    }
}

/// Parse `source` and apply it to `word`.
///
/// # Example
/// ```
/// use soundchange::evolve;
///
/// let out = evolve("P = p t k\nN = m n ŋ\n{0:P} > {0:N}", "ta").unwrap();
/// assert_eq!(out.output, "na");
/// ```
pub fn evolve(source: &str, word: &str) -> Result<Evolution> {
    let rules = RuleList::parse_str(source)?;
    evolve_with(&rules, word)
}

/// Apply an already parsed rule list to `word`.
///
/// Use this when the same rules are applied to many words.
pub fn evolve_with(rules: &RuleList, word: &str) -> Result<Evolution> {
    let started = Instant::now();
    let (output, trace) = rules.apply(word)?;

    Ok(Evolution { input: word.to_string(), output, trace, elapsed: started.elapsed() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn evolve_returns_output_and_trace() {
        let res = evolve("// nasals\nP = p t k\nN = m n ŋ\n{0:N} > 0 / _{0:P}", "mtnt").unwrap();

        assert_eq!(res.input, "mtnt");
        assert_eq!(res.output, "mtt");
        assert_eq!(res.trace.len(), 4);
        assert_eq!(res.trace[0], "// nasals");
        assert!(res.elapsed >= Duration::ZERO);
        assert!(!res.is_unchanged());
    }

    #[test]
    fn evolve_with_reuses_a_list() {
        let rules = RuleList::parse_str("0 > a / _#").unwrap();
        for (word, expected) in [("top", "topa"), ("top taco", "topa tacoa"), ("", "a")] {
            assert_eq!(evolve_with(&rules, word).unwrap().output, expected, "word `{word}`");
        }
    }

    #[test]
    fn evolve_reports_parse_errors() {
        let err = evolve("a > b\n{Q} > c", "a").unwrap_err();
        assert!(matches!(err, Error::Line { line: 2, .. }));
    }
}
