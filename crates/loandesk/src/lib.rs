//! Loan lifecycle engine and back-office workflows for small-business
//! lending.

pub mod config;
pub mod error;
pub mod lending;
pub mod telemetry;
