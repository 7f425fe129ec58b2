//! User-facing output.
//!
//! The pipeline never prompts; everything here is a side-effecting sink
//! with four severities (status, success, warning, error).

pub mod formatter;

pub use formatter::{
    compose, display_error, display_release_failed, display_status, display_success,
    display_warning, report_setting, setting_line,
};

use crate::settings::ReleaseSettings;

/// Print the resolved settings, one line per field.
pub fn report_settings(settings: &ReleaseSettings) {
    for row in settings.report() {
        report_setting(row.description, &row.value, row.is_default);
    }
}
