//! Inbound message dispatch.
//!
//! A line is addressed to the bot either through the configured command
//! prefix (`~eval ...`) or by mention (`goplay eval ...`). Everything else
//! is normal channel traffic and produces zero side effects, as does a
//! recognized address with an unknown command name: other bots may share
//! the prefix.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::command::{Invocation, MessageSink, Policy, Replier};
use crate::registry::Registry;

pub struct Dispatcher {
    registry: Arc<Registry>,
    sink: Arc<dyn MessageSink>,
    prefix: String,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, sink: Arc<dyn MessageSink>, prefix: &str) -> Self {
        Self {
            registry,
            sink,
            prefix: prefix.to_string(),
        }
    }

    /// Handle one inbound chat line.
    ///
    /// Sequential handlers complete before this returns; concurrent ones are
    /// spawned and their handle returned, but the dispatcher never joins it
    /// -- outstanding invocations are deliberately untracked and unbounded.
    pub async fn dispatch(
        &self,
        self_nick: &str,
        target: &str,
        sender: &str,
        text: &str,
    ) -> Option<JoinHandle<()>> {
        let (name, args) = parse_command(text, &self.prefix, self_nick)?;
        let command = self.registry.lookup(name)?;

        // A private message's nominal target is our own nick; replying
        // there would talk to ourselves.
        let reply_target = if target == self_nick { sender } else { target };

        info!(command = name, %sender, %target, args, "dispatching command");

        let invocation = Invocation {
            command: name.to_string(),
            args: args.to_string(),
            reply_target: reply_target.to_string(),
            sender: sender.to_string(),
        };
        let replier = Replier::new(self.sink.clone(), &invocation);

        match command.policy() {
            Policy::Sequential => {
                command.run(invocation, replier).await;
                None
            }
            Policy::Concurrent => Some(tokio::spawn(async move {
                command.run(invocation, replier).await;
            })),
        }
    }
}

/// Split off the first whitespace-delimited word; the remainder has its
/// leading whitespace removed but is otherwise verbatim.
fn split_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim_start()),
        None => (text, ""),
    }
}

/// Apply the addressing grammar: prefix form, then mention form.
/// Returns `(command_name, argument_text)` or `None` for unaddressed lines.
fn parse_command<'a>(text: &'a str, prefix: &str, self_nick: &str) -> Option<(&'a str, &'a str)> {
    if !prefix.is_empty() {
        if let Some(rest) = text.strip_prefix(prefix) {
            let (name, args) = split_word(rest);
            if !name.is_empty() {
                return Some((name, args));
            }
        }
    }
    let (first, rest) = split_word(text);
    if first == self_nick && !rest.is_empty() {
        let (name, args) = split_word(rest);
        return Some((name, args));
    }
    None
}
