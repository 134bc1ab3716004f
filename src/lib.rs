//! Facet Aggregator
//!
//! Aggregates nested facet counts into flat, sorted per-facet totals.
//!
//! Two interchangeable strategies produce identical results:
//! - **buffered**: parse the whole document, build a facet tree, recurse
//! - **streaming**: one pass over the JSON token stream with a stack of
//!   open facet names
//!
//! This crate provides the core implementation for the
//! `facet-aggregator` CLI and HTTP server.
//!
//! ## Getting Started
//!
//! ```bash
//! facet-aggregator serve --port 8080
//! facet-aggregator aggregate --input facets.json --strategy streaming
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod server;
pub mod utils;
