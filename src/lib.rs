//! Research-paper metadata explorer.
//!
//! Loads a metadata file, cleans it, and computes the descriptive
//! aggregates behind a publications dashboard for a chosen range of
//! publication years.

pub mod config;
pub mod data;
pub mod report;
pub mod state;
