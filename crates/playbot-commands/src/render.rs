//! Result rendering: one execution result in, one reply line out.
//!
//! Output safety rules, applied in order: keep only the first line of the
//! first event, trim its edges, strip BEL, and if anything non-printable
//! survives, suppress the whole thing rather than leak control sequences to
//! the channel. When more than one event exists a count note is appended,
//! since only the first is shown.

use playbot_playground::{CompileResponse, PlayEvent};

/// Reply for a run that produced no output.
pub const NO_OUTPUT: &str = "Complete, but no prints";

/// Replacement when the first output line still contains control characters.
pub const SUPPRESSED: &str = "Output suppressed, non-printable characters detected.";

/// Placeholder keeping the line shape stable when share creation failed.
pub const NO_SHARE_LINK: &str = "Unable to create share link";

/// Render the output events of a successful run.
pub fn render_events(events: &[PlayEvent]) -> String {
    let Some(first) = events.first() else {
        return NO_OUTPUT.to_string();
    };
    let line = first.message.split(['\n', '\r']).next().unwrap_or_default();
    let line: String = line.trim().chars().filter(|&c| c != '\x07').collect();
    let line = if line.chars().any(char::is_control) {
        SUPPRESSED.to_string()
    } else {
        line
    };
    if events.len() > 1 {
        format!("{line} (First line only. {} events returned)", events.len())
    } else {
        line
    }
}

/// Render a full execution result with the share-link prefix rule.
///
/// Compile failures show the trimmed diagnostic alone; run results are
/// prefixed with the share link, or the fixed placeholder when share
/// creation degraded.
pub fn render_run(response: &CompileResponse, share: Option<&str>) -> String {
    if !response.errors.is_empty() {
        return response.errors.trim().to_string();
    }
    let core = render_events(&response.events);
    format!("{} : {}", share.unwrap_or(NO_SHARE_LINK), core)
}
