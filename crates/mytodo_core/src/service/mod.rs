//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, auth and document sync into list use-cases.
//! - Keep the screen/FFI layers decoupled from storage details.

pub mod todo_service;
