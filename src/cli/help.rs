//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string used in log fields (e.g. "install", "update.manifest").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init { .. } => "init",
        Commands::Install { url: Some(_), .. } => "install.url",
        Commands::Install { url: None, .. } => "install.manifest",
        Commands::Uninstall { .. } => "uninstall",
        Commands::Update { url: Some(_), .. } => "update.url",
        Commands::Update { url: None, .. } => "update.manifest",
        Commands::List { .. } => "list",
        Commands::Status { .. } => "status",
    }
}

/// Whether the command writes the manifest, the lock file or the data directory.
pub fn is_mutating(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Install { .. } | Commands::Uninstall { .. } | Commands::Update { .. }
    )
}
