//! AWS-oriented adapters and handlers for the CSV cleaning Lambda.
//!
//! This crate owns runtime integration details (the object-created handler,
//! the object store port, and logging setup). Domain behavior lives in
//! `csv_cleaner_core`.

pub mod adapters;
pub mod handlers;
pub mod telemetry;
