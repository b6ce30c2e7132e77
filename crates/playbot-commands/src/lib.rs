//! Command layer: registry, dispatcher, renderer, and the built-in commands.
//!
//! The [`Dispatcher`] parses inbound chat lines against the prefix/mention
//! grammar, resolves the command in an immutable [`Registry`], and runs the
//! handler under its declared concurrency policy with a [`Replier`] bound to
//! the right reply target. Handlers convert every outcome, success or error,
//! into exactly one reply line.

pub mod builtins;
pub mod command;
pub mod dispatch;
pub mod registry;
pub mod render;

pub use builtins::register_builtins;
pub use command::{BotCommand, Invocation, MessageSink, Policy, Replier, SinkError};
pub use dispatch::Dispatcher;
pub use registry::Registry;
