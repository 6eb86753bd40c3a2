//! Deterministic, pure logic shared by the dispatcher.
//!
//! Core modules must be free of I/O side effects. They operate on paths and
//! strings already obtained by the caller and return deterministic outputs.

pub mod config;
pub mod context;
pub mod header;
pub mod invocation;
pub mod types;
