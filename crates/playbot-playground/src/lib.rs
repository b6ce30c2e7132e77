//! Go Playground clients.
//!
//! [`PlayClient`] talks to the two remote services the bot depends on: the
//! execution service (`/compile`) and the sharing service (`/share`,
//! `/p/<id>`). [`locator`] decides whether a user-supplied string names a
//! shared snippet at all, before any network access happens.

pub mod client;
pub mod locator;

pub use client::{CompileResponse, PlayClient, PlayEvent};

/// Errors from the Playground services.
///
/// Share-link creation is deliberately absent: its failure degrades to a
/// placeholder and is never surfaced as an error.
#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    /// The execution service failed (network error or non-success status).
    #[error("execution service error: {0}")]
    Service(String),

    /// The input is neither a playground URL nor a bare snippet id.
    #[error("not a playground snippet link or id")]
    UnresolvableReference,

    /// The sharing service has no snippet under the given id.
    #[error("snippet not found")]
    SnippetNotFound,

    /// The sharing service failed to deliver an existing snippet.
    #[error("could not fetch snippet: {0}")]
    SnippetFetch(String),
}
