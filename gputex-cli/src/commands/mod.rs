//! CLI subcommands.

pub mod capabilities;
pub mod common;
pub mod plan;
pub mod select;
