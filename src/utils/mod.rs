//! Utility modules for the static site generator.

pub mod date;
pub mod exec;
pub mod git;
pub mod minify;
pub mod slug;
