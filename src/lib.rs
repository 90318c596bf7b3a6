//! Department Bookkeeper
//!
//! This crate tracks per-department spending limits, records payment-advice
//! transactions against those limits across fiscal years, and computes
//! summary and running-balance views over a spreadsheet-shaped persistent
//! store.

pub mod core;
pub mod import;
pub mod store;
