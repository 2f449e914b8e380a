//! Command-line interface module.

mod args;
pub mod build;
pub mod fix;
pub mod render;
pub mod search;

pub use args::{Cli, Commands};
