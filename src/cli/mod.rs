// CLI module
// Public interface for command-line interface

mod commands;

pub use commands::{run, Cli, Command};
