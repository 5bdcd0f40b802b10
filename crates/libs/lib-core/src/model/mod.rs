//! # Model Layer
//!
//! Entities and repositories backed by SQLite.

pub mod store;
