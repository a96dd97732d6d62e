//! Domain model for the cross-reference index.
//!
//! # Responsibility
//! - Define the entry, notebook and occurrence shapes used by repositories
//!   and services.
//! - Own page normalization, the only formatting rule the index depends on
//!   for ordering.
//!
//! # Invariants
//! - Entry names are unique; lookup is by exact match.
//! - A stored page is always normalized or an explicit redirect marker.

pub mod entry;
pub mod occurrence;
pub mod page;
