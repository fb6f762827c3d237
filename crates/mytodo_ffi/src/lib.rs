//! Flutter-facing bindings for MyTodo core.

pub mod api;
