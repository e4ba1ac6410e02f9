//! CLI presentation: text and json formatters per command family.

mod init;
mod install;
mod inventory;
mod shared;

pub use init::format_init_result;
pub use install::{format_manifest_install, format_uninstall, format_url_install};
pub use inventory::{
    format_list_json, format_list_text, format_status_json, format_status_text,
};
pub use shared::Style;
