//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the item store contract consumed by services and views.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Item::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod item_repo;
