//! Progressive tiered-range engine.
//!
//! This crate stores ordered numeric ranges, each carrying a rate, and applies
//! them progressively to an input amount. Two scopes share the engine: global
//! income tax brackets (rates as fractions) and per-KPI commission tiers
//! (rates as percentages).

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
