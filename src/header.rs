use std::collections::BTreeSet;

use crate::error::{MatchError, Result};

pub const VALUE_COLUMN: &str = "value";

/// Column layout of a validated dataset header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    // predicate names in header order, paired index-wise with their positions
    predicates: Vec<String>,
    predicate_indices: Vec<usize>,
    value_index: usize,
    header: Vec<String>,
}

impl HeaderLayout {
    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }
    pub fn predicate_indices(&self) -> &[usize] {
        &self.predicate_indices
    }
    pub fn value_index(&self) -> usize {
        self.value_index
    }
    pub fn header(&self) -> &[String] {
        &self.header
    }
    /// Number of fields a row needs before it can be matched.
    pub fn width(&self) -> usize {
        self.header.len()
    }
}

/// Checks that the header has a `value` column and that every other column,
/// taken as a set, equals `expected`.
pub fn validate_header(header: &[String], expected: &BTreeSet<String>) -> Result<HeaderLayout> {
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let value_index = header
        .iter()
        .position(|h| h == VALUE_COLUMN)
        .ok_or_else(|| MatchError::key_mismatch(expected, header.iter().filter(|h| *h != VALUE_COLUMN)))?;

    let mut seen = BTreeSet::new();
    let mut predicates = Vec::new();
    let mut predicate_indices = Vec::new();
    for (i, name) in header.iter().enumerate() {
        if name == VALUE_COLUMN || !seen.insert(name.clone()) {
            continue;
        }
        predicates.push(name.clone());
        predicate_indices.push(i);
    }
    if &seen != expected {
        return Err(MatchError::key_mismatch(expected, &seen));
    }
    Ok(HeaderLayout {
        predicates,
        predicate_indices,
        value_index,
        header,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }
    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn layout_follows_header_order() {
        let layout = validate_header(&strings(&["name", "value", "id"]), &set(&["id", "name"])).unwrap();
        assert_eq!(layout.predicates(), &strings(&["name", "id"])[..]);
        assert_eq!(layout.predicate_indices(), &[0, 2]);
        assert_eq!(layout.value_index(), 1);
        assert_eq!(layout.width(), 3);
    }

    #[test]
    fn missing_value_column_is_a_mismatch() {
        let err = validate_header(&strings(&["id", "name"]), &set(&["id", "name"])).unwrap_err();
        assert!(matches!(err, MatchError::KeyMismatch { .. }));
    }

    #[test]
    fn subset_and_superset_are_mismatches() {
        let header = strings(&["id", "name", "value"]);
        assert!(validate_header(&header, &set(&["id"])).is_err());
        assert!(validate_header(&header, &set(&["id", "name", "age"])).is_err());
    }

    #[test]
    fn header_names_are_trimmed() {
        let layout = validate_header(&strings(&[" id ", " value"]), &set(&["id"])).unwrap();
        assert_eq!(layout.value_index(), 1);
    }
}
