//! Framework-agnostic view models for the list and detail screens.
//!
//! # Responsibility
//! - Hold per-screen UI state (selection, note input, confirmation).
//! - Translate user actions into service and stopwatch calls.
//! - Re-render only on explicit store or stopwatch events.
//!
//! # Invariants
//! - Store failures land in a visible error state; they never panic.
//! - Views receive the item service as an explicit argument.

pub mod detail;
pub mod list;
