//! In-memory address index.
//!
//! # Ordering and ties
//!
//! Records keep their source order.  Every result list is in **first-seen
//! order** and deduplicated by display name, the first occurrence winning.
//! Callers that need a single answer take the first element, so "first in
//! the source file" is the documented tie-break among equal prefixes.

use std::collections::HashSet;

use log::warn;

use sr_core::PlanarPoint;

use crate::{AddressError, AddressResult};

/// Queries shorter than this many characters are rejected without scanning.
pub const MIN_QUERY_CHARS: usize = 2;

/// Cap on [`AddressIndex::contains`] results.
pub const SUGGESTION_LIMIT: usize = 10;

/// A display name and its planar position.
#[derive(Clone, Debug, PartialEq)]
pub struct AddressRecord {
    pub name:  String,
    pub point: PlanarPoint,
}

impl AddressRecord {
    pub fn new(name: impl Into<String>, point: PlanarPoint) -> Self {
        Self { name: name.into(), point }
    }
}

/// Immutable, scan-based address lookup.
#[derive(Debug, Clone)]
pub struct AddressIndex {
    records: Vec<AddressRecord>,
}

impl AddressIndex {
    /// Build the index, skipping records with a blank name or a non-finite
    /// position.
    ///
    /// # Errors
    ///
    /// [`AddressError::NoRecords`] if nothing usable remains.
    pub fn build<I>(records: I) -> AddressResult<Self>
    where
        I: IntoIterator<Item = AddressRecord>,
    {
        let mut kept = Vec::new();
        let mut skipped = 0usize;
        for r in records {
            if r.name.trim().is_empty() {
                warn!("skipping address with blank name at {}", r.point);
                skipped += 1;
            } else if !r.point.is_finite() {
                warn!("skipping address {:?}: non-finite position", r.name);
                skipped += 1;
            } else {
                kept.push(r);
            }
        }
        if kept.is_empty() {
            return Err(AddressError::NoRecords { skipped });
        }
        Ok(Self { records: kept })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in source order.
    pub fn records(&self) -> &[AddressRecord] {
        &self.records
    }

    /// Records whose name starts with `query`, case-sensitive.
    ///
    /// # Errors
    ///
    /// [`AddressError::EmptyQuery`] for queries under [`MIN_QUERY_CHARS`]
    /// characters; no record is examined.
    pub fn search(&self, query: &str) -> AddressResult<Vec<&AddressRecord>> {
        check_query(query)?;
        Ok(dedup_by_name(
            self.records.iter().filter(|r| r.name.starts_with(query)),
            usize::MAX,
        ))
    }

    /// First record whose name starts with `query`.
    ///
    /// Same as `search(query)?.first()` without collecting the rest.
    pub fn first_match(&self, query: &str) -> AddressResult<Option<&AddressRecord>> {
        check_query(query)?;
        Ok(self.records.iter().find(|r| r.name.starts_with(query)))
    }

    /// Narrow [`search`](Self::search) to names containing `query`,
    /// ignoring case, capped at [`SUGGESTION_LIMIT`].
    ///
    /// Never returns a record that `search(query)` would not.
    pub fn contains(&self, query: &str) -> AddressResult<Vec<&AddressRecord>> {
        self.contains_limited(query, SUGGESTION_LIMIT)
    }

    /// [`contains`](Self::contains) with an explicit cap.
    pub fn contains_limited(
        &self,
        query: &str,
        limit: usize,
    ) -> AddressResult<Vec<&AddressRecord>> {
        let needle = query.to_lowercase();
        Ok(self
            .search(query)?
            .into_iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect())
    }

    /// Records whose name contains `query` anywhere, ignoring case, capped
    /// at `limit`.
    ///
    /// Unlike [`contains`](Self::contains) this scans every record, not the
    /// prefix matches, so `"main"` finds `"RUE MAIN"`.  Used for type-ahead
    /// when no name starts with the query.
    pub fn substring_search(
        &self,
        query: &str,
        limit: usize,
    ) -> AddressResult<Vec<&AddressRecord>> {
        check_query(query)?;
        let needle = query.to_lowercase();
        Ok(dedup_by_name(
            self.records
                .iter()
                .filter(|r| r.name.to_lowercase().contains(&needle)),
            limit,
        ))
    }
}

fn check_query(query: &str) -> AddressResult<()> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(AddressError::EmptyQuery(query.to_owned()));
    }
    Ok(())
}

fn dedup_by_name<'a, I>(matches: I, limit: usize) -> Vec<&'a AddressRecord>
where
    I: Iterator<Item = &'a AddressRecord>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    matches
        .filter(|&r| seen.insert(r.name.as_str()))
        .take(limit)
        .collect()
}
