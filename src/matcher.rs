//! The matching engine: single-query lookups through the match cache and
//! single-pass batch lookups folded into a parity-weighted average.

use std::collections::HashMap;

use tracing::debug;

use crate::aggregate::WeightedAverage;
use crate::cache::{CacheHasher, CacheKey, MatchCache, MatchOutcome};
use crate::error::{MatchError, Result};
use crate::header::validate_header;
use crate::identity::DataIdentity;
use crate::query::Query;
use crate::source::{DataSource, Row};

pub struct Matcher<'c> {
    cache: &'c MatchCache,
}

impl<'c> Matcher<'c> {
    pub fn new(cache: &'c MatchCache) -> Self {
        Self { cache }
    }
    pub fn cache(&self) -> &MatchCache {
        self.cache
    }

    /// Returns the trimmed `value` of the first row matching every predicate
    /// of `query`, or `"-1"` when no row does or the dataset is empty.
    ///
    /// Results, including misses, are cached per dataset identity. A header
    /// whose predicate columns differ from the query's keys fails with
    /// [`MatchError::KeyMismatch`] and leaves the cache untouched.
    pub fn lookup(&self, query: &Query, source: DataSource) -> Result<String> {
        let identity = DataIdentity::resolve(&source)?;
        let key = identity
            .is_cacheable()
            .then(|| CacheKey::new(identity, query));
        if let Some(key) = &key {
            if let Some(hit) = self.cache.get(key)? {
                return Ok(hit.into_string());
            }
        }
        let outcome = self.find_first(query, source)?;
        if let Some(key) = key {
            self.cache.put(key, outcome.clone())?;
        }
        Ok(outcome.into_string())
    }

    fn find_first(&self, query: &Query, source: DataSource) -> Result<MatchOutcome> {
        let mut rows = source.open()?;
        let Some(header) = rows.header()? else {
            return Ok(MatchOutcome::NotFound);
        };
        let layout = validate_header(&header, &query.keys())?;
        let expected = query.values_in(layout.predicates());
        let value_index = layout.value_index();
        for row in rows.rows(layout.width()) {
            let row = row?;
            if row_matches(&row, layout.predicate_indices(), &expected) {
                return Ok(MatchOutcome::Found(row[value_index].trim().to_string()));
            }
        }
        Ok(MatchOutcome::NotFound)
    }

    /// Matches every distinct query in one pass over the dataset and returns
    /// the parity-weighted average of the matched numeric values, formatted
    /// with one fractional digit.
    ///
    /// Yields `"-1"` for an empty batch, an empty dataset, or when no matched
    /// value is an integer. Duplicate queries count once. This path neither
    /// reads nor fills the match cache.
    pub fn batch_lookup(&self, queries: &[Query], source: DataSource) -> Result<String> {
        let Some(first) = queries.first() else {
            return Ok(MatchOutcome::NOT_FOUND.to_string());
        };
        let keys = first.keys();
        for query in &queries[1..] {
            let found = query.keys();
            if found != keys {
                return Err(MatchError::key_mismatch(&keys, &found));
            }
        }

        let mut rows = source.open()?;
        let Some(header) = rows.header()? else {
            return Ok(MatchOutcome::NOT_FOUND.to_string());
        };
        let layout = validate_header(&header, &keys)?;

        // one slot per distinct target tuple, filled by its first matching row
        let mut targets: HashMap<Row, Option<String>, CacheHasher> = HashMap::default();
        for query in queries {
            targets.entry(query.values_in(layout.predicates())).or_insert(None);
        }
        let mut remaining = targets.len();
        let value_index = layout.value_index();
        let mut probe: Row = Vec::with_capacity(layout.predicates().len());
        for row in rows.rows(layout.width()) {
            let row = row?;
            probe.clear();
            probe.extend(layout.predicate_indices().iter().map(|&i| row[i].trim().to_string()));
            match targets.get_mut(&probe) {
                Some(slot) if slot.is_none() => {
                    *slot = Some(row[value_index].trim().to_string());
                    remaining -= 1;
                }
                _ => continue,
            }
            if remaining == 0 {
                debug!(targets = targets.len(), "every target matched, stopping scan");
                break;
            }
        }

        let mut average = WeightedAverage::new();
        for value in targets.values().flatten() {
            average.push_field(value);
        }
        debug!(
            targets = targets.len(),
            unmatched = remaining,
            skipped = average.skipped(),
            "batch aggregated"
        );
        Ok(average
            .formatted()
            .unwrap_or_else(|| MatchOutcome::NOT_FOUND.to_string()))
    }
}

fn row_matches(row: &[String], indices: &[usize], expected: &[String]) -> bool {
    indices
        .iter()
        .zip(expected)
        .all(|(&i, want)| row[i].trim() == want)
}
