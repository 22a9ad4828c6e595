//! Name similarity policy used for "did you mean" suggestions.
//!
//! The index asks a [`NameMatcher`] whether an indexed name is close enough
//! to a query to be suggested. The default [`SubstringMatcher`] is a coarse
//! containment test; any other policy (edit distance, token overlap) can be
//! plugged in with [`SchoolIndex::with_matcher`](crate::SchoolIndex::with_matcher)
//! without touching the resolver.

/// Decides whether `candidate` should be suggested for `query`.
pub trait NameMatcher: Send + Sync {
    fn matches(&self, query: &str, candidate: &str) -> bool;
}

/// Bidirectional, case-sensitive substring containment.
///
/// `candidate` matches when it contains `query` or `query` contains it.
/// No whitespace or Unicode normalization is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl NameMatcher for SubstringMatcher {
    fn matches(&self, query: &str, candidate: &str) -> bool {
        candidate.contains(query) || query.contains(candidate)
    }
}

impl<F> NameMatcher for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn matches(&self, query: &str, candidate: &str) -> bool {
        self(query, candidate)
    }
}
