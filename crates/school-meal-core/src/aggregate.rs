//! Per-school meal fetching and report assembly.
//!
//! [`aggregate`] fetches one meal document per resolved school through a
//! [`MealFetcher`], classifies each response into a [`MealOutcome`], and
//! collects everything into a [`MealReport`] whose `Display` output is the
//! text returned to the user.
//!
//! # Isolation
//!
//! A failed or timed-out fetch produces an error block for that school
//! only; the other schools are still reported.
//!
//! # Ordering
//!
//! Fetches run concurrently (bounded), but the report always lists schools
//! in the order they were resolved, whatever order the fetches finish in.
//!
//! # Report Shape
//!
//! One school renders as its block alone. Several schools render as:
//!
//! ```text
//! Found 2 schools named "삼성초등학교".
//!
//! [서울특별시교육청] 삼성초등학교 2025-04-08 meal info:
//! ...
//!
//! --------------------------------------------------
//!
//! [경기도교육청] 삼성초등학교: no meal data for 20250408
//! ```

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::date::MealDate;
use crate::menu::{MealDocument, ServedMeal, NO_DATA_CODE};
use crate::models::SchoolIdentity;

/// Separator line between school blocks in a multi-school report.
pub const BLOCK_SEPARATOR: &str = "--------------------------------------------------";

/// Source of meal documents, one per (office, school, date).
///
/// The application implements this against the NEIS Open API; tests use
/// in-memory stubs.
#[async_trait]
pub trait MealFetcher: Send + Sync {
    /// Fetch the meal document for one school and date.
    ///
    /// Transport, HTTP status, timeout, and decoding failures are all
    /// reported as `Err` and rendered as a per-school error block.
    async fn fetch(&self, office_code: &str, school_code: &str, date: MealDate)
        -> Result<MealDocument>;
}

/// What happened for one school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealOutcome {
    /// Meal rows, cleaned and ready to render.
    Served(Vec<ServedMeal>),
    /// No meal served (`INFO-200`, or an empty row list).
    NoData,
    /// Any other API result code.
    ApiError { code: String, message: String },
    /// The fetch itself failed.
    FetchFailed(String),
    /// Rows were present but none could be decoded.
    Unformattable,
}

impl MealOutcome {
    /// Classify a successfully fetched document.
    pub fn from_document(document: &MealDocument) -> Self {
        if let Some(result) = &document.result {
            if result.code == NO_DATA_CODE {
                return MealOutcome::NoData;
            }
            return MealOutcome::ApiError {
                code: result.code.clone(),
                message: result.message.clone(),
            };
        }

        let rows = match document.rows() {
            Some(rows) if !rows.is_empty() => rows,
            _ => return MealOutcome::NoData,
        };

        let meals: Vec<ServedMeal> = rows
            .iter()
            .filter_map(|row| match ServedMeal::from_row(row) {
                Ok(meal) => Some(meal),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable meal row");
                    None
                }
            })
            .collect();

        if meals.is_empty() {
            MealOutcome::Unformattable
        } else {
            MealOutcome::Served(meals)
        }
    }
}

/// The outcome for one resolved school.
#[derive(Debug, Clone)]
pub struct SchoolMeal {
    pub school: SchoolIdentity,
    pub outcome: MealOutcome,
}

impl SchoolMeal {
    /// Render this school's block of the report.
    pub fn render(&self, date: MealDate) -> String {
        let label = self.school.label();
        match &self.outcome {
            MealOutcome::Served(meals) => {
                let body: Vec<String> = meals.iter().map(ServedMeal::render).collect();
                format!(
                    "{} {} meal info:\n\n{}",
                    label,
                    date.dashed(),
                    body.join("\n\n")
                )
            }
            MealOutcome::NoData => format!("{}: no meal data for {}", label, date),
            MealOutcome::ApiError { code, message } => {
                format!("{}: API error {} - {}", label, code, message)
            }
            MealOutcome::FetchFailed(message) => format!("{}: fetch failed: {}", label, message),
            MealOutcome::Unformattable => {
                format!("{}: could not format meal data for {}", label, date)
            }
        }
    }
}

/// All per-school outcomes for one query, in resolution order.
#[derive(Debug, Clone)]
pub struct MealReport {
    pub date: MealDate,
    pub entries: Vec<SchoolMeal>,
}

impl MealReport {
    /// Whether more than one school was queried.
    pub fn is_ambiguous(&self) -> bool {
        self.entries.len() > 1
    }
}

impl fmt::Display for MealReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entries.as_slice() {
            [] => Ok(()),
            [single] => f.write_str(&single.render(self.date)),
            entries => {
                write!(
                    f,
                    "Found {} schools named \"{}\".\n\n",
                    entries.len(),
                    entries[0].school.school_name
                )?;
                let separator = format!("\n\n{}\n\n", BLOCK_SEPARATOR);
                let blocks: Vec<String> = entries.iter().map(|e| e.render(self.date)).collect();
                f.write_str(&blocks.join(&separator))
            }
        }
    }
}

/// Fetch and classify meals for every school, keeping input order.
///
/// At most `max_concurrent` fetches are in flight at once (minimum 1).
pub async fn aggregate(
    schools: &[SchoolIdentity],
    date: MealDate,
    fetcher: &dyn MealFetcher,
    max_concurrent: usize,
) -> MealReport {
    let entries: Vec<SchoolMeal> = stream::iter(schools.iter().cloned())
        .map(|school: SchoolIdentity| async move {
            let outcome = match fetcher
                .fetch(&school.office_code, &school.school_code, date)
                .await
            {
                Ok(document) => MealOutcome::from_document(&document),
                Err(e) => {
                    tracing::warn!(
                        school = %school.school_name,
                        office = %school.office_code,
                        error = %format!("{:#}", e),
                        "meal fetch failed"
                    );
                    MealOutcome::FetchFailed(format!("{:#}", e))
                }
            };
            SchoolMeal { school, outcome }
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    MealReport { date, entries }
}
