//! CLI command implementations

pub mod completions;
pub mod config;
pub mod member;
pub mod path;
pub mod relation;
pub mod serve;
pub mod tree;
