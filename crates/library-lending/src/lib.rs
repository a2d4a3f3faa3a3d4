//! Lending policy engine for a library: decides whether a reader may borrow a
//! set of books and records the resulting loans.

pub mod config;
pub mod error;
pub mod lending;
pub mod telemetry;
