//! Compiled rule files, reloaded only when they change on disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;

use super::chain::expand_pairs;
use super::loader::load_file;
use crate::engine::RuleList;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct CachedFile {
    modified: SystemTime,
    rules: Arc<RuleList>,
}

/// Map from path to the rule list last compiled from it.
#[derive(Debug, Default)]
pub struct RuleCache {
    files: HashMap<PathBuf, CachedFile>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled rules for `path`, reloading the file only if it
    /// was modified after the cached copy was read.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Arc<RuleList>> {
        let path = path.as_ref();
        let modified = fs::metadata(path).and_then(|meta| meta.modified()).map_err(|err| Error::io(path, err))?;

        if let Some(cached) = self.files.get(path) {
            if cached.modified >= modified {
                return Ok(Arc::clone(&cached.rules));
            }
            debug!("[cache:stale] path={}", path.display());
        }

        let rules = Arc::new(load_file(path)?);
        self.files.insert(path.to_path_buf(), CachedFile { modified, rules: Arc::clone(&rules) });
        Ok(rules)
    }

    /// Apply one rule file to `word`.
    pub fn apply_file(&mut self, word: &str, path: impl AsRef<Path>) -> Result<(String, Vec<String>)> {
        self.load_file(path)?.apply(word)
    }

    /// Apply several rule files in turn, threading the word through them and
    /// concatenating their traces.
    pub fn apply_files<P: AsRef<Path>>(
        &mut self,
        word: &str,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<(String, Vec<String>)> {
        let mut word = word.to_string();
        let mut trace = Vec::new();
        for path in paths {
            let (next, lines) = self.apply_file(&word, path)?;
            word = next;
            trace.extend(lines);
        }
        Ok((word, trace))
    }

    /// Load every stage of a chain up front, so that a broken file is
    /// reported before any word is processed.
    pub fn load_chain<S: AsRef<str>>(
        &mut self,
        prefix: &str,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Vec<Arc<RuleList>>> {
        chain_paths(prefix, names)?.iter().map(|path| self.load_file(path)).collect()
    }

    /// Apply a staged chain of files (see [`expand_pairs`]), each name
    /// prefixed with `prefix`.
    pub fn apply_chain<S: AsRef<str>>(
        &mut self,
        word: &str,
        prefix: &str,
        names: impl IntoIterator<Item = S>,
    ) -> Result<(String, Vec<String>)> {
        let paths = chain_paths(prefix, names)?;
        self.apply_files(word, paths)
    }

    /// Number of files currently cached.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn chain_paths<S: AsRef<str>>(prefix: &str, names: impl IntoIterator<Item = S>) -> Result<Vec<PathBuf>> {
    Ok(expand_pairs(names)?.into_iter().map(|name| PathBuf::from(format!("{prefix}{name}"))).collect())
}
