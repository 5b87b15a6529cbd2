//! Aggregation and derived metrics over the cleaned datasets.
//!
//! This module groups cleaned records by location, label, room category,
//! bed type or bracket, computes value indices, gaps, the price/rating
//! regression and correlations, and assembles them into one report.

pub mod aggregate;
pub mod analyzer;
pub mod bracket;
pub mod correlation;
pub mod metrics;
pub mod regression;
pub mod types;
pub mod utility;
