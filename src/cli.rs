//! CLI domain: parse, route, help, output, and presentation only.
//! No reconciliation logic; a single route table dispatches to the engine.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, is_mutating};
pub use output::{
    exit_code, map_error, EXIT_DOWNLOAD_FAILED, EXIT_INVALID_INPUT, EXIT_NOT_FOUND,
    EXIT_PREPROCESS_FAILED, EXIT_STORAGE, EXIT_SUCCESS,
};
pub use parse::{Cli, Commands};
pub use presentation::Style;
pub use route::{CommandOutput, RunContext};
