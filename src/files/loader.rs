use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::engine::RuleList;
use crate::error::{Error, Result};

impl RuleList {
    /// Read a rule source line by line.
    ///
    /// Parse errors carry the 1-based line number. Read failures are
    /// reported against `origin`.
    pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Self> {
        let mut list = RuleList::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| Error::io(origin, err))?;
            list.parse_line(&line).map_err(|err| err.at_line(idx + 1))?;
        }
        Ok(list)
    }
}

/// Load and compile a rule file.
///
/// ```no_run
/// let rules = soundchange::load_file("rules/latin.sc").unwrap();
/// println!("{} entries", rules.len());
/// ```
pub fn load_file(path: impl AsRef<Path>) -> Result<RuleList> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| Error::io(path, err))?;
    let list = RuleList::from_reader(BufReader::new(file), path).map_err(|err| match err {
        io @ Error::Io { .. } => io,
        other => other.in_file(path),
    })?;
    debug!("[file:loaded] path={} entries={}", path.display(), list.len());
    Ok(list)
}
