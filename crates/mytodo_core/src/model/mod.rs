//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define the item shape shared by the store, renderer and document sync.
//!
//! # Invariants
//! - Items carry no identifier; matching is by value.
//! - `text` is fixed at creation, only `is_done` changes.

pub mod todo;
