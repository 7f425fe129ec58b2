//! Pure formatting functions for UI output.
//!
//! Every `format_*` function returns the rendered line so it can be tested;
//! the matching `display_*` function prints it to the right stream.

use console::style;

/// Join message fragments with single spaces, dropping empty fragments.
///
/// Lets callers build messages with optional clauses:
/// ```ignore
/// compose(&["Sync check passed", if verbose { "(hashes equal)" } else { "" }])
/// ```
pub fn compose(fragments: &[&str]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.trim())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").for_stderr().red().bold(), message)
}

pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

pub fn format_warning(message: &str) -> String {
    format!("{} {}", style("⚠ WARNING:").for_stderr().yellow(), message)
}

/// Render a resolved setting as "`<description>` is set to `<value>`",
/// marking values that equal their built-in default.
pub fn setting_line(description: &str, value: &str, is_default: bool) -> String {
    let value = format!("`{}`", value);
    compose(&[
        description,
        "is set to",
        value.as_str(),
        if is_default { "(default)" } else { "" },
    ])
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{}", format_error(message));
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{}", format_success(message));
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{}", format_status(message));
}

/// Format and print a non-fatal notice.
pub fn display_warning(message: &str) {
    eprintln!("{}", format_warning(message));
}

/// Print one line of the settings report.
pub fn report_setting(description: &str, value: &str, is_default: bool) {
    display_status(&setting_line(description, value, is_default));
}

/// Print the closing banner shown whenever a run aborts.
pub fn display_release_failed() {
    display_error(
        "Release failed. Inspect the messages above and clean up manually (local commits, tags or a partially updated changelog) before running again.",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_drops_empty_fragments() {
        assert_eq!(compose(&["Branch", "", "is clean", ""]), "Branch is clean");
    }

    #[test]
    fn test_compose_all_empty() {
        assert_eq!(compose(&["", "  ", ""]), "");
    }

    #[test]
    fn test_setting_line_default() {
        assert_eq!(
            setting_line("Sign commit and tag", "false", true),
            "Sign commit and tag is set to `false` (default)"
        );
    }

    #[test]
    fn test_setting_line_override() {
        assert_eq!(
            setting_line("Git remote", "upstream", false),
            "Git remote is set to `upstream`"
        );
    }

    #[test]
    fn test_severity_markers_are_distinct() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
        assert_eq!(format_error("boom"), "ERROR: boom");
        assert_eq!(format_success("done"), "✓ done");
        assert_eq!(format_status("running"), "→ running");
        assert_eq!(format_warning("careful"), "⚠ WARNING: careful");
    }

    #[test]
    fn test_display_functions_do_not_panic() {
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_warning("test warning");
        report_setting("Dist tag", "latest", true);
    }
}
