//! Domain model for timestamped items.
//!
//! # Responsibility
//! - Define the persisted `Item` record shared by list and detail views.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Deletion is a hard delete; notes never outlive their item.

pub mod item;
