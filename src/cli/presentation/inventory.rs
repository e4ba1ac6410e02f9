//! List and status presentation using comfy-table.

use super::shared::{to_pretty_json, Style};
use crate::reconcile::{ConsistencyReport, ListedContent};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

pub fn format_list_text(listed: &[ListedContent], style: Style) -> String {
    if listed.is_empty() {
        return "No contents installed.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "URL", "Path", "Updated"]);
    for item in listed {
        let path = if item.file_present {
            item.content.path.display().to_string()
        } else {
            format!("{} (missing)", item.content.path.display())
        };
        table.add_row(vec![
            item.content.display_name().to_string(),
            item.content.url.clone(),
            path,
            item.content.last_updated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    }

    let missing = listed.iter().filter(|l| !l.file_present).count();
    let mut out = format!("{}\n{}", style.heading("Installed contents"), table);
    if missing > 0 {
        out.push('\n');
        out.push_str(&style.warning(&format!(
            "{} installed file(s) missing; run 'dim update' to fetch them again.",
            missing
        )));
    }
    out
}

pub fn format_list_json(listed: &[ListedContent]) -> String {
    to_pretty_json(&json!({ "contents": listed }))
}

pub fn format_status_text(report: &ConsistencyReport, style: Style) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style.heading("Status")));

    if report.is_clean() && report.unmanaged.is_empty() {
        out.push_str(&style.success("Manifest and lock file are in sync."));
        return out;
    }

    if !report.pending.is_empty() {
        out.push_str(&format!("\nNot installed yet ({}):\n", report.pending.len()));
        for content in &report.pending {
            out.push_str(&format!("  - {}\n", content.url));
        }
    }
    if !report.unmanaged.is_empty() {
        out.push_str(&format!("\nInstalled without a manifest entry ({}):\n", report.unmanaged.len()));
        for content in &report.unmanaged {
            out.push_str(&format!("  - {}\n", content.url));
        }
    }
    if !report.stale.is_empty() {
        out.push_str(&format!("\n{}\n", style.warning(&format!("Missing files ({}):", report.stale.len()))));
        for content in &report.stale {
            out.push_str(&format!("  - {} ({})\n", content.url, content.path.display()));
        }
    }
    out.trim_end().to_string()
}

pub fn format_status_json(report: &ConsistencyReport) -> String {
    to_pretty_json(&json!({
        "clean": report.is_clean(),
        "pending": report.pending,
        "unmanaged": report.unmanaged,
        "stale": report.stale,
    }))
}
