//! # School Meal
//!
//! Korean school meal lookup over the NEIS Open API, exposed as an MCP
//! tool, an HTTP API, and a CLI.
//!
//! The name index, resolver, date handling, and report formatting live in
//! the I/O-free [`school_meal_core`] crate. This crate adds everything that
//! touches the outside world.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ corpus/*.json│──▶│ SchoolIndex │──▶│ MealService  │◀── NeisClient (reqwest)
//! └──────────────┘   └─────────────┘   └──────┬───────┘
//!                                             │
//!                       ┌──────────────┬──────┴───────┐
//!                       ▼              ▼              ▼
//!                  ┌─────────┐   ┌──────────┐   ┌──────────┐
//!                  │   CLI   │   │ MCP stdio│   │   HTTP   │
//!                  └─────────┘   └──────────┘   │ REST+MCP │
//!                                               └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`corpus`] | Loading school records from disk |
//! | [`neis`] | NEIS meal API client |
//! | [`meal`] | Service wiring and CLI commands |
//! | [`traits`] | Tool trait and registry |
//! | [`mcp`] | MCP protocol bridge |
//! | [`server`] | HTTP server |

pub mod config;
pub mod corpus;
pub mod logging;
pub mod mcp;
pub mod meal;
pub mod neis;
pub mod server;
pub mod traits;
