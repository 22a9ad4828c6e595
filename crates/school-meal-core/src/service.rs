//! The end-to-end meal lookup used by every entry point.
//!
//! CLI commands, the MCP tool, and the HTTP API all hold the same
//! [`MealService`] and differ only in how they read input and write
//! output.

use std::sync::Arc;

use crate::aggregate::{aggregate, MealFetcher, MealReport};
use crate::date::{normalize_date, Clock, MealDate};
use crate::index::{SchoolIndex, DEFAULT_SUGGESTION_LIMIT};
use crate::resolve::{not_found_message, resolve, Resolution};

/// Tuning knobs for [`MealService`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Maximum number of similar names offered when nothing matches.
    pub suggestion_limit: usize,
    /// Maximum number of meal fetches in flight for one query.
    pub max_concurrent_fetches: usize,
    /// Source of "today" for relative dates.
    pub clock: Clock,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            max_concurrent_fetches: 4,
            clock: Clock::Local,
        }
    }
}

/// Outcome of a meal lookup before rendering.
#[derive(Debug, Clone)]
pub enum MealAnswer {
    /// The name matched nothing; suggestions may be empty.
    NotFound { name: String, suggestions: Vec<String> },
    /// One or more schools matched.
    Report(MealReport),
}

impl MealAnswer {
    /// The text shown to the user.
    pub fn render(&self) -> String {
        match self {
            MealAnswer::NotFound { name, suggestions } => not_found_message(name, suggestions),
            MealAnswer::Report(report) => report.to_string(),
        }
    }
}

/// Name resolution plus meal aggregation over an immutable index.
pub struct MealService {
    index: Arc<SchoolIndex>,
    fetcher: Arc<dyn MealFetcher>,
    options: ServiceOptions,
}

impl MealService {
    pub fn new(index: Arc<SchoolIndex>, fetcher: Arc<dyn MealFetcher>, options: ServiceOptions) -> Self {
        Self {
            index,
            fetcher,
            options,
        }
    }

    pub fn index(&self) -> &SchoolIndex {
        &self.index
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Normalize a date expression against this service's clock.
    pub fn normalize_date(&self, input: Option<&str>) -> MealDate {
        normalize_date(input, self.options.clock.today())
    }

    /// Resolve a school name against the index.
    pub fn resolve(&self, name: &str) -> Resolution {
        resolve(&self.index, name, self.options.suggestion_limit)
    }

    /// Resolve `name`, fetch meals for `date`, and return the structured answer.
    pub async fn lookup(&self, name: &str, date: Option<&str>) -> MealAnswer {
        let date = self.normalize_date(date);
        let resolution = self.resolve(name);

        if resolution.is_empty() {
            return MealAnswer::NotFound {
                name: name.to_string(),
                suggestions: resolution.suggestions,
            };
        }

        tracing::debug!(
            school = name,
            %date,
            matches = resolution.identities.len(),
            "fetching meals"
        );
        let report = aggregate(
            &resolution.identities,
            date,
            self.fetcher.as_ref(),
            self.options.max_concurrent_fetches,
        )
        .await;
        MealAnswer::Report(report)
    }

    /// Resolve, fetch, and render in one step.
    pub async fn meal_info(&self, name: &str, date: Option<&str>) -> String {
        self.lookup(name, date).await.render()
    }
}
