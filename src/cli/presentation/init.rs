//! Init command presentation.

use super::shared::Style;
use crate::bootstrap::InitResult;

pub fn format_init_result(result: &InitResult, force: bool, style: Style) -> String {
    let mut output = String::new();
    for path in &result.created {
        let suffix = if force && path.is_file() { " (reset)" } else { "" };
        output.push_str(&format!("  ✓ {}{}\n", path.display(), suffix));
    }
    for path in &result.skipped {
        output.push_str(&format!("  ⊘ {} (already exists, skipped)\n", path.display()));
    }
    output.push_str(&style.success("Initialized the project for dim."));
    output
}
