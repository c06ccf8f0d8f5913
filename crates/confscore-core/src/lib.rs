//! confscore-core: confidence-weighted scoring and group comparison.
//!
//! This crate defines the data model, the ABS/CWS scorers, participant
//! aggregation and the one-tailed CG-vs-EG comparison that the rest of
//! confscore builds on.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod scoring;
pub mod statistics;
