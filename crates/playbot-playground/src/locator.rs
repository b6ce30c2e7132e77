//! Snippet reference resolution.
//!
//! A user-supplied reference is either a full playground share URL
//! (`https://play.golang.org/p/<id>`), a bare snippet id (8 or more
//! alphanumerics, optional `.go` extension), or garbage. Recognition is
//! anchored and purely local; nothing touches the network until a reference
//! has been recognized.

use std::sync::OnceLock;

use regex::Regex;

use crate::{PlayClient, PlaygroundError};

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:https?://)?play\.golang\.org/p/([A-Za-z0-9]{8,}(?:\.go)?)$")
            .expect("url pattern is valid")
    })
}

fn id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]{8,}(?:\.go)?$").expect("id pattern is valid")
    })
}

/// Resolve a reference string to the fetchable snippet id, with the `.go`
/// suffix appended if absent. Unrecognized input fails without any network
/// access.
pub fn resolve(reference: &str) -> Result<String, PlaygroundError> {
    let reference = reference.trim();
    let id = if let Some(captures) = url_pattern().captures(reference) {
        // Anchored pattern; group 1 always present on a match.
        captures.get(1).map(|m| m.as_str()).unwrap_or_default()
    } else if id_pattern().is_match(reference) {
        reference
    } else {
        return Err(PlaygroundError::UnresolvableReference);
    };

    if id.ends_with(".go") {
        Ok(id.to_string())
    } else {
        Ok(format!("{id}.go"))
    }
}

/// Resolve a reference and fetch its source from the sharing service.
pub async fn fetch_snippet(
    client: &PlayClient,
    reference: &str,
) -> Result<String, PlaygroundError> {
    let id = resolve(reference)?;
    client.fetch(&id).await
}
