//! confscore-report: HTML and CSV outputs for analysis reports.

pub mod html;
pub mod table;
