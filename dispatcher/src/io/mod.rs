//! I/O helpers for dispatcher commands.

pub mod catalog;
pub mod config;
pub mod process;
pub mod resolve;
