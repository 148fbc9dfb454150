//! Core domain types and logic.

pub mod dashboard;
pub mod entry;
pub mod error;
pub mod filter;
