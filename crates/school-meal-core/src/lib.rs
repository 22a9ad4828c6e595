//! # School Meal Core
//!
//! Shared, I/O-free logic for School Meal: school identities, the name
//! index, name resolution, date normalization, menu cleanup, and meal
//! report aggregation.
//!
//! This crate contains no tokio, filesystem, or HTTP dependencies. Meal
//! documents are obtained through the [`aggregate::MealFetcher`] trait,
//! which the application crate implements against the NEIS Open API.
//!
//! ## Pipeline
//!
//! ```text
//! JSON records ──▶ corpus ──▶ SchoolIndex ──▶ resolve() ──▶ aggregate() ──▶ text
//!                                  ▲                             ▲
//!                           NameMatcher                     MealFetcher
//! ```

pub mod aggregate;
pub mod corpus;
pub mod date;
pub mod index;
pub mod matcher;
pub mod menu;
pub mod models;
pub mod resolve;
pub mod service;

pub use aggregate::{aggregate, MealFetcher, MealOutcome, MealReport, SchoolMeal};
pub use date::{normalize_date, Clock, MealDate};
pub use index::{DuplicateName, SchoolIndex};
pub use matcher::{NameMatcher, SubstringMatcher};
pub use menu::{clean_menu_text, MealDocument, ServedMeal};
pub use models::SchoolIdentity;
pub use resolve::{not_found_message, resolve, Resolution};
pub use service::{MealAnswer, MealService, ServiceOptions};
