//! Data models: configuration, extracted records, and extraction outcomes.

pub mod config;
pub mod outcome;
pub mod record;
