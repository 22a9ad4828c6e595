//! School name resolution.
//!
//! School names collide across regional education offices, and the index
//! only remembers the last school per name. Resolution therefore combines
//! two sources:
//!
//! 1. the index's exact hit (if any), then
//! 2. every corpus record with exactly the same name,
//!
//! deduplicated by `(office_code, school_code)` in discovery order. When
//! neither finds anything, the index's similarity lookup supplies
//! suggestions instead.

use serde::Serialize;

use crate::index::SchoolIndex;
use crate::models::SchoolIdentity;

/// Schools matching a queried name, or suggestions when none do.
///
/// Exactly one of the two lists is non-empty unless nothing at all was
/// found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub identities: Vec<SchoolIdentity>,
    pub suggestions: Vec<String>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

/// Resolve `name` to every school that carries it.
pub fn resolve(index: &SchoolIndex, name: &str, suggestion_limit: usize) -> Resolution {
    let mut identities: Vec<SchoolIdentity> = Vec::new();

    if let Some(hit) = index.lookup_exact(name) {
        identities.push(hit.clone());
    }

    for record in index.scan_name(name) {
        if !identities.iter().any(|known| known.key() == record.key()) {
            identities.push(record.clone());
        }
    }

    if identities.is_empty() {
        let suggestions: Vec<String> = index
            .lookup_similar(name, suggestion_limit)
            .into_iter()
            .map(str::to_string)
            .collect();
        tracing::debug!(school = name, suggestions = suggestions.len(), "no school matched");
        return Resolution {
            identities,
            suggestions,
        };
    }

    if identities.len() > 1 {
        tracing::info!(school = name, count = identities.len(), "school name is shared by several schools");
    }

    Resolution {
        identities,
        suggestions: Vec::new(),
    }
}

/// User-facing text for a name that resolved to nothing.
pub fn not_found_message(name: &str, suggestions: &[String]) -> String {
    let mut message = format!("No school found matching \"{}\".", name);
    if !suggestions.is_empty() {
        message.push_str("\n\nSimilar school names: ");
        message.push_str(&suggestions.join(", "));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(office: &str, code: &str, name: &str) -> SchoolIdentity {
        SchoolIdentity::new(office, format!("{} office", office), code, name)
    }

    #[test]
    fn test_shared_name_returns_all() {
        let index = SchoolIndex::build(vec![
            school("B10", "1", "A"),
            school("J10", "2", "A"),
        ]);
        let res = resolve(&index, "A", 3);
        assert_eq!(res.identities.len(), 2);
        assert!(res.suggestions.is_empty());
        // index hit (last written) first, then corpus order
        assert_eq!(res.identities[0].office_code, "J10");
        assert_eq!(res.identities[1].office_code, "B10");
    }

    #[test]
    fn test_duplicate_records_deduplicated_by_key() {
        let index = SchoolIndex::build(vec![
            school("B10", "1", "A"),
            school("B10", "1", "A"),
            school("J10", "1", "A"),
            school("B10", "2", "A"),
        ]);
        let res = resolve(&index, "A", 3);
        let keys: Vec<(&str, &str)> = res.identities.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![("B10", "2"), ("B10", "1"), ("J10", "1")]);
    }

    #[test]
    fn test_single_match() {
        let index = SchoolIndex::build(vec![school("B10", "1", "A"), school("B10", "2", "B")]);
        let res = resolve(&index, "B", 3);
        assert_eq!(res.identities.len(), 1);
        assert_eq!(res.identities[0].school_code, "2");
    }

    #[test]
    fn test_no_match_gives_suggestions() {
        let index = SchoolIndex::build(vec![school("B10", "1", "XYZ"), school("B10", "2", "ABC")]);
        let res = resolve(&index, "Z", 3);
        assert!(res.is_empty());
        assert_eq!(res.suggestions, vec!["XYZ".to_string()]);
    }

    #[test]
    fn test_partial_name_is_not_a_match() {
        let index = SchoolIndex::build(vec![school("J10", "1", "경민고등학교")]);
        let res = resolve(&index, "경민", 3);
        assert!(res.identities.is_empty());
        assert_eq!(res.suggestions, vec!["경민고등학교".to_string()]);
    }

    #[test]
    fn test_suggestion_limit() {
        let index = SchoolIndex::build(
            (1..=5)
                .map(|i| school("B10", &i.to_string(), &format!("학교{}", i)))
                .collect(),
        );
        let res = resolve(&index, "학교", 2);
        assert_eq!(res.suggestions, vec!["학교1".to_string(), "학교2".to_string()]);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(not_found_message("Z", &[]), "No school found matching \"Z\".");
        assert_eq!(
            not_found_message("Z", &["XYZ".to_string(), "Zeta".to_string()]),
            "No school found matching \"Z\".\n\nSimilar school names: XYZ, Zeta"
        );
    }
}
