use crate::error::{Error, Result};

/// Expand staged file names given as `(base, ".a.b.c")` pairs.
///
/// Each pair yields every intermediate stage after `base`:
///
/// ```text
/// ("",      ".a.b.c")  ->  a, a.b, a.b.c
/// ("latin", ".it.fr")  ->  latin.it, latin.it.fr
/// ```
///
/// ```
/// let names = soundchange::expand_pairs(["", ".a.b", "c", ".d"]).unwrap();
/// assert_eq!(names, ["a", "a.b", "c.d"]);
/// ```
pub fn expand_pairs<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Result<Vec<String>> {
    let names: Vec<S> = names.into_iter().collect();
    if names.len() % 2 != 0 {
        return Err(Error::MalformedStageChain {
            message: format!("expected pairs of names, got {} names", names.len()),
        });
    }

    let mut out = Vec::new();
    for pair in names.chunks_exact(2) {
        let (base, steps) = (pair[0].as_ref(), pair[1].as_ref());
        if !steps.starts_with('.') {
            return Err(Error::MalformedStageChain {
                message: format!("second element `{steps}` does not begin with `.`"),
            });
        }

        // ".a.b" -> [".a", ".a.b"]
        let stages = steps.match_indices('.').skip(1).map(|(idx, _)| &steps[..idx]).chain(std::iter::once(steps));
        for stage in stages {
            if base.is_empty() {
                out.push(stage.strip_prefix('.').unwrap_or(stage).to_string());
            } else {
                out.push(format!("{base}{stage}"));
            }
        }
    }
    Ok(out)
}
