//! IRC transport for playbot.
//!
//! [`wire`] is the pure protocol layer: line parsing, message builders, and
//! the 512-byte line budget. [`client`] owns the socket: registration
//! (optionally with SASL), keepalive, and the event channel the bot's run
//! loop consumes. The command layer never sees either; it talks to the
//! transport through its message-sink seam.

pub mod client;
pub mod wire;

pub use client::{Client, Event, IrcError};
