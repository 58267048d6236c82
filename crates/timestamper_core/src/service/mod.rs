//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep views and the CLI decoupled from storage details.

pub mod item_service;
