//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate entry/occurrence repositories into index use-cases.
//! - Route user-facing warnings through an injected sink.

pub mod index_service;
pub mod warning;
