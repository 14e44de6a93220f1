//! Rowmatch – exact-match lookups over CSV datasets with an identity-aware cache.
//!
//! A dataset is a CSV table whose first row is a header. One column is
//! literally named `value`; every other column is a *predicate column*. A
//! [`query::Query`] maps each predicate column to the value a row must hold
//! there, and its key set must equal the predicate columns exactly.
//!
//! Two operations are offered:
//! * [`matcher::Matcher::lookup`] – the trimmed `value` of the first row that
//!   matches a single query, or `"-1"`. Results are cached.
//! * [`matcher::Matcher::batch_lookup`] – matches a list of queries in one pass
//!   and averages the matched integer values, weighting even values 20 and odd
//!   values 10, formatted with one fractional digit (or `"-1"`).
//!
//! ## Modules
//! * [`source`] – [`source::DataSource`] (file, text or row stream) and the lazy
//!   [`source::RowSource`] read from it.
//! * [`header`] – header validation and the column layout used while matching.
//! * [`identity`] – cheap dataset fingerprints (stat for files, truncated blake3
//!   for text) that key the cache without reading file contents.
//! * [`cache`] – the LRU [`cache::MatchCache`], 1024 entries by default.
//! * [`aggregate`] – the parity-weighted average.
//! * [`matcher`] – the engine tying the above together.
//! * [`config`] – [`config::EngineConfig`], loaded with the `config` crate.
//!
//! ## Caching
//! A cache entry is keyed by the dataset identity and the query's pairs sorted
//! by column name. A file's identity folds in its modification time and size,
//! so an edited file simply produces new keys. Row streams have no identity
//! that outlives a call and are never cached. Batch lookups do not use the
//! cache at all.
//!
//! ## Quick Start
//! ```
//! use rowmatch::{cache::MatchCache, matcher::Matcher, query::Query, source::DataSource};
//! let cache = MatchCache::new();
//! let matcher = Matcher::new(&cache);
//! let data = "id,name,value\n1,Alice,10\n2,Bob,15\n";
//! let query = Query::new().with("id", 2).with("name", "Bob");
//! assert_eq!(matcher.lookup(&query, DataSource::Text(data)).unwrap(), "15");
//! let batch = [query, Query::new().with("id", 1).with("name", "Alice")];
//! assert_eq!(matcher.batch_lookup(&batch, DataSource::Text(data)).unwrap(), "11.7");
//! ```

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod header;
pub mod identity;
pub mod matcher;
pub mod query;
pub mod source;

use lazy_static::lazy_static;

pub use crate::error::{MatchError, Result};

use crate::cache::MatchCache;
use crate::matcher::Matcher;
use crate::query::Query;
use crate::source::DataSource;

lazy_static! {
    /// Process-wide cache behind [`lookup`]; independent matchers own their own.
    pub static ref GLOBAL_CACHE: MatchCache = MatchCache::new();
}

/// [`Matcher::lookup`] against the process-wide cache.
pub fn lookup(query: &Query, source: DataSource) -> Result<String> {
    Matcher::new(&GLOBAL_CACHE).lookup(query, source)
}

/// [`Matcher::batch_lookup`]; kept next to [`lookup`] for symmetry.
pub fn batch_lookup(queries: &[Query], source: DataSource) -> Result<String> {
    Matcher::new(&GLOBAL_CACHE).batch_lookup(queries, source)
}
