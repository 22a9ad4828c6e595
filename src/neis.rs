//! NEIS Open API meal client.
//!
//! Implements [`MealFetcher`] with a single `GET` against the
//! `mealServiceDietInfo` endpoint per school:
//!
//! ```text
//! GET {endpoint}?Type=json&pIndex=1&pSize={page_size}
//!     &ATPT_OFCDC_SC_CODE={office}&SD_SCHUL_CODE={school}&MLSV_YMD=YYYYMMDD[&KEY={api_key}]
//! ```
//!
//! The request timeout comes from `[neis].timeout_secs`. Non-2xx statuses,
//! transport errors, timeouts, and undecodable bodies all surface as `Err`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use school_meal_core::{MealDate, MealDocument, MealFetcher};

use crate::config::NeisConfig;

/// HTTP client for the NEIS meal service.
#[derive(Clone)]
pub struct NeisClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    page_size: u32,
}

impl NeisClient {
    pub fn new(config: &NeisConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.resolved_api_key(),
            page_size: config.page_size,
        })
    }

    fn query(&self, office_code: &str, school_code: &str, date: MealDate) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("Type", "json".to_string()),
            ("pIndex", "1".to_string()),
            ("pSize", self.page_size.to_string()),
            ("ATPT_OFCDC_SC_CODE", office_code.to_string()),
            ("SD_SCHUL_CODE", school_code.to_string()),
            ("MLSV_YMD", date.to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("KEY", key.clone()));
        }
        query
    }
}

#[async_trait]
impl MealFetcher for NeisClient {
    async fn fetch(&self, office_code: &str, school_code: &str, date: MealDate) -> Result<MealDocument> {
        tracing::debug!(office = office_code, school = school_code, %date, "requesting meal data");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(office_code, school_code, date))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(office = office_code, school = school_code, %status, "NEIS request failed");
            bail!("API request failed: {}", status);
        }

        let document = response
            .json::<MealDocument>()
            .await
            .context("invalid meal response")?;
        Ok(document)
    }
}
