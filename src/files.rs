//! Rule files on disk.
//!
//! Everything here sits on top of the engine and only calls into it:
//!
//! ```text
//! names ── expand_pairs ──> ["a", "a.b", ...]      (chain.rs)
//!                                │ prefix + name
//!                                v
//!                      RuleCache::load_file          (cache.rs)
//!                        - stat, compare mtime
//!                        - reload through load_file (loader.rs)
//!                                │
//!                                v
//!                        Arc<RuleList> per stage
//! ```

#[path = "files/cache.rs"]
mod cache;
#[path = "files/chain.rs"]
mod chain;
#[path = "files/loader.rs"]
mod loader;

pub use cache::RuleCache;
pub use chain::expand_pairs;
pub use loader::load_file;
