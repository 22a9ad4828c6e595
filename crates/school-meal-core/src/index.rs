//! Name → identity index over the loaded corpus.
//!
//! # Shadowed exact lookup
//!
//! The exact-name map keeps **one** identity per name: the last record
//! with that name in corpus order. Earlier records with the same name are
//! shadowed for [`lookup_exact`](SchoolIndex::lookup_exact) only. They
//! remain in the backing corpus, which the resolver scans to recover every
//! school sharing a name. The shadowing is observable behavior and is kept
//! as is; the exact hit is *a* school with that name, not *the* school.
//!
//! Every identity returned by `lookup_exact(name)` is also present in
//! [`corpus`](SchoolIndex::corpus) with the same name.

use std::collections::HashMap;

use serde::Serialize;

use crate::matcher::{NameMatcher, SubstringMatcher};
use crate::models::SchoolIdentity;

/// Default number of suggestions returned by [`SchoolIndex::lookup_similar`].
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

/// Immutable index built once from the corpus and shared read-only.
pub struct SchoolIndex {
    corpus: Vec<SchoolIdentity>,
    /// name → position in `corpus` of the last record with that name.
    exact: HashMap<String, usize>,
    /// Distinct names in first-insertion order (iteration order for suggestions).
    names: Vec<String>,
    matcher: Box<dyn NameMatcher>,
}

/// A school name shared by more than one corpus record.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateName {
    pub name: String,
    pub identities: Vec<SchoolIdentity>,
}

impl SchoolIndex {
    /// Build the index from validated records in source order.
    pub fn build(records: Vec<SchoolIdentity>) -> Self {
        let mut exact: HashMap<String, usize> = HashMap::with_capacity(records.len());
        let mut names = Vec::new();

        for (pos, record) in records.iter().enumerate() {
            if exact.insert(record.school_name.clone(), pos).is_none() {
                names.push(record.school_name.clone());
            }
        }

        Self {
            corpus: records,
            exact,
            names,
            matcher: Box::new(SubstringMatcher),
        }
    }

    /// Replace the similarity policy used by [`lookup_similar`](Self::lookup_similar).
    pub fn with_matcher(mut self, matcher: impl NameMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// The identity most recently indexed under `name`, if any.
    pub fn lookup_exact(&self, name: &str) -> Option<&SchoolIdentity> {
        self.exact.get(name).map(|&pos| &self.corpus[pos])
    }

    /// Up to `limit` indexed names the matcher accepts for `name`, in
    /// index iteration order.
    pub fn lookup_similar(&self, name: &str, limit: usize) -> Vec<&str> {
        self.names
            .iter()
            .filter(|candidate| self.matcher.matches(name, candidate.as_str()))
            .take(limit)
            .map(String::as_str)
            .collect()
    }

    /// Every record with exactly this name, in corpus order.
    pub fn scan_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SchoolIdentity> + 'a {
        self.corpus.iter().filter(move |s| s.school_name == name)
    }

    /// The full backing corpus in load order.
    pub fn corpus(&self) -> &[SchoolIdentity] {
        &self.corpus
    }

    /// Number of records in the corpus (duplicates included).
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Number of distinct school names.
    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    /// Names used by more than one record, most-duplicated first.
    ///
    /// Ties keep index iteration order.
    pub fn duplicate_names(&self) -> Vec<DuplicateName> {
        let mut groups: HashMap<&str, Vec<SchoolIdentity>> = HashMap::new();
        for record in &self.corpus {
            groups
                .entry(record.school_name.as_str())
                .or_default()
                .push(record.clone());
        }

        let mut duplicates: Vec<DuplicateName> = self
            .names
            .iter()
            .filter_map(|name| {
                let identities = groups.remove(name.as_str())?;
                (identities.len() > 1).then(|| DuplicateName {
                    name: name.clone(),
                    identities,
                })
            })
            .collect();

        duplicates.sort_by(|a, b| b.identities.len().cmp(&a.identities.len()));
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(office: &str, code: &str, name: &str) -> SchoolIdentity {
        SchoolIdentity::new(office, format!("{}교육청", office), code, name)
    }

    #[test]
    fn test_exact_lookup_last_write_wins() {
        let index = SchoolIndex::build(vec![
            school("B10", "1", "삼성초등학교"),
            school("C10", "2", "삼성초등학교"),
        ]);
        let hit = index.lookup_exact("삼성초등학교").unwrap();
        assert_eq!(hit.office_code, "C10");
        assert_eq!(index.len(), 2);
        assert_eq!(index.name_count(), 1);
    }

    #[test]
    fn test_exact_hit_is_in_corpus_scan() {
        let index = SchoolIndex::build(vec![
            school("B10", "1", "A"),
            school("C10", "2", "B"),
            school("D10", "3", "A"),
        ]);
        let hit = index.lookup_exact("A").unwrap();
        assert!(index.scan_name("A").any(|s| s == hit));
        assert_eq!(index.scan_name("A").count(), 2);
    }

    #[test]
    fn test_exact_lookup_missing() {
        let index = SchoolIndex::build(vec![school("B10", "1", "A")]);
        assert!(index.lookup_exact("Z").is_none());
    }

    #[test]
    fn test_similar_in_first_insertion_order() {
        let index = SchoolIndex::build(vec![
            school("B10", "1", "경민고등학교"),
            school("B10", "2", "서울고등학교"),
            school("J10", "3", "경민여자고등학교"),
            school("J10", "4", "경민고등학교"),
            school("J10", "5", "경민중학교"),
            school("J10", "6", "경민초등학교"),
        ]);
        let similar = index.lookup_similar("경민", DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(similar, vec!["경민고등학교", "경민여자고등학교", "경민중학교"]);
    }

    #[test]
    fn test_similar_query_contains_name() {
        let index = SchoolIndex::build(vec![school("B10", "1", "XYZ")]);
        assert_eq!(index.lookup_similar("XYZ고등학교", 3), vec!["XYZ"]);
    }

    #[test]
    fn test_similar_empty_index() {
        let index = SchoolIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.lookup_similar("anything", 3).is_empty());
    }

    #[test]
    fn test_custom_matcher() {
        let index = SchoolIndex::build(vec![
            school("B10", "1", "서울고등학교"),
            school("B10", "2", "고등학교서울"),
        ])
        .with_matcher(|q: &str, c: &str| c.starts_with(q));
        assert_eq!(index.lookup_similar("서울", 3), vec!["서울고등학교"]);
    }

    #[test]
    fn test_duplicate_names_sorted_by_count() {
        let index = SchoolIndex::build(vec![
            school("B10", "1", "A"),
            school("C10", "2", "B"),
            school("D10", "3", "B"),
            school("E10", "4", "A"),
            school("F10", "5", "B"),
            school("G10", "6", "C"),
        ]);
        let dups = index.duplicate_names();
        assert_eq!(dups.len(), 2);
        assert_eq!(dups[0].name, "B");
        assert_eq!(dups[0].identities.len(), 3);
        assert_eq!(dups[1].name, "A");
        assert_eq!(dups[1].identities[1].office_code, "E10");
    }
}
