//! Service construction and the meal-related CLI commands.
//!
//! Every entry point (CLI, MCP, HTTP) obtains its [`MealService`] from
//! [`build_service`], so the corpus is loaded and indexed exactly once per
//! process.

use anyhow::Result;
use std::sync::Arc;

use school_meal_core::{MealFetcher, MealService};

use crate::config::Config;
use crate::corpus::build_index;
use crate::neis::NeisClient;

/// Load the corpus and wire it to the NEIS client.
pub fn build_service(config: &Config) -> Result<Arc<MealService>> {
    let fetcher = Arc::new(NeisClient::new(&config.neis)?);
    build_service_with_fetcher(config, fetcher)
}

/// Like [`build_service`], with a caller-supplied meal source.
pub fn build_service_with_fetcher(
    config: &Config,
    fetcher: Arc<dyn MealFetcher>,
) -> Result<Arc<MealService>> {
    let index = build_index(&config.corpus)?;
    Ok(Arc::new(MealService::new(
        Arc::new(index),
        fetcher,
        config.service_options(),
    )))
}

/// `schoolmeal meal <school> [--date]`
pub async fn run_meal(config: &Config, school: &str, date: Option<&str>) -> Result<()> {
    let service = build_service(config)?;
    println!("{}", service.meal_info(school, date).await);
    Ok(())
}

/// `schoolmeal find <school>`
pub fn run_find(config: &Config, school: &str) -> Result<()> {
    let service = build_service(config)?;
    let resolution = service.resolve(school);

    if resolution.is_empty() {
        println!(
            "{}",
            school_meal_core::not_found_message(school, &resolution.suggestions)
        );
        return Ok(());
    }

    println!("{:<10} {:<12} {:<24} SCHOOL", "OFFICE", "SCHOOL_CODE", "OFFICE_NAME");
    for school in &resolution.identities {
        println!(
            "{:<10} {:<12} {:<24} {}",
            school.office_code, school.school_code, school.office_name, school.school_name
        );
    }
    Ok(())
}

/// `schoolmeal duplicates [--top N]`
pub fn run_duplicates(config: &Config, top: usize) -> Result<()> {
    let service = build_service(config)?;
    let duplicates = service.index().duplicate_names();

    if duplicates.is_empty() {
        println!("No duplicate school names.");
        return Ok(());
    }

    println!(
        "{} names are shared by more than one school.",
        duplicates.len()
    );
    for duplicate in duplicates.iter().take(top) {
        println!();
        println!("{} ({} schools)", duplicate.name, duplicate.identities.len());
        for school in &duplicate.identities {
            println!(
                "  - {} (office {}, school {})",
                school.office_name, school.office_code, school.school_code
            );
        }
    }
    Ok(())
}
