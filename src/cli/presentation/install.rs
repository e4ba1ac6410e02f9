//! Install, update and uninstall presentation.

use super::shared::Style;
use crate::reconcile::{FileRemoval, ManifestInstallOutcome, UninstallOutcome, UrlInstallOutcome};

pub fn format_url_install(outcome: &UrlInstallOutcome, style: Style) -> String {
    match outcome {
        UrlInstallOutcome::AlreadyInstalled { url } => {
            style.warning(&format!("{} is already installed.", url))
        }
        UrlInstallOutcome::Installed(entry) => format!(
            "{}\n  {} -> {}",
            style.success(&format!("Installed {}.", entry.display_name())),
            entry.url,
            entry.path.display()
        ),
        UrlInstallOutcome::Updated(entry) => format!(
            "{}\n  {} -> {}",
            style.success(&format!("Updated {}.", entry.display_name())),
            entry.url,
            entry.path.display()
        ),
    }
}

pub fn format_manifest_install(outcome: &ManifestInstallOutcome, update: bool, style: Style) -> String {
    match outcome {
        ManifestInstallOutcome::NoContents => {
            style.warning("No contents in the manifest. Add one with 'dim install <url>'.")
        }
        ManifestInstallOutcome::NothingToDo => {
            style.warning("All contents have already been installed.")
        }
        ManifestInstallOutcome::Completed {
            installed,
            failures,
        } => {
            let verb = if update { "Updated" } else { "Installed" };
            let mut lines = Vec::new();
            for entry in installed {
                lines.push(format!("  ✓ {} -> {}", entry.url, entry.path.display()));
            }
            for failure in failures {
                lines.push(style.failure(&format!("  ✗ {}: {}", failure.url, failure.reason)));
            }
            let summary = format!("{} {} of {} contents.", verb, installed.len(), installed.len() + failures.len());
            if failures.is_empty() {
                lines.push(style.success(&summary));
            } else {
                lines.push(style.failure(&summary));
            }
            lines.join("\n")
        }
    }
}

pub fn format_uninstall(outcome: &UninstallOutcome, style: Style) -> String {
    let mut lines = Vec::new();
    if !outcome.manifest_removed {
        lines.push(style.warning("  Not registered in the manifest."));
    }
    if !outcome.lock_removed {
        lines.push(style.warning("  Not present in the lock file."));
    }
    match &outcome.file {
        FileRemoval::Deleted(path) => lines.push(format!("  Deleted {}", path.display())),
        FileRemoval::AlreadyAbsent(path) => {
            lines.push(style.warning(&format!("  {} was already missing.", path.display())))
        }
        FileRemoval::StillReferenced { path, by } => lines.push(style.warning(&format!(
            "  Kept {}; it is still used by {}.",
            path.display(),
            by
        ))),
        FileRemoval::NotTracked => {}
    }
    lines.push(style.success(&format!("Uninstalled {}.", outcome.url)));
    lines.join("\n")
}
