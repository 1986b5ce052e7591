//! CLI module

mod commands;
mod output;

pub use commands::Cli;
pub use output::write_listing;
