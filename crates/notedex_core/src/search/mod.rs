//! Read-only index queries.
//!
//! # Responsibility
//! - Find entries that occur near a given notebook page.
//! - Keep result ordering inside core.

pub mod proximity;
