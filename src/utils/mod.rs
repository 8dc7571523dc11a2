//! Shared utilities

pub mod cmdline;
pub mod paths;
pub mod terminal;
