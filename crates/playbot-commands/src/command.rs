//! Command trait, invocation value, and the reply seam.
//!
//! [`MessageSink`] is the only surface the command layer needs from the
//! transport; the IRC client implements it in the binary, tests implement it
//! with a recording fake.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

/// Per-command concurrency policy.
///
/// Handlers that call remote services must be `Concurrent` so a slow call
/// never stalls the dispatcher's message loop; purely local handlers may be
/// `Sequential`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Sequential,
    Concurrent,
}

/// One parsed, dispatched occurrence of a recognized command.
///
/// Transient: derived per inbound message, discarded after handling. The
/// reply state is explicit here rather than captured in a closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The matched command name.
    pub command: String,
    /// Everything after the command name; may be empty.
    pub args: String,
    /// Channel or nick the reply goes to.
    pub reply_target: String,
    /// Bare nickname of the sender.
    pub sender: String,
}

/// Error sending a reply line through the transport.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Stateless send operation the transport provides.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_line(&self, target: &str, text: &str) -> Result<(), SinkError>;
}

/// Reply capability bound to one invocation's target.
///
/// Replies into a shared channel are attributed with the sender's nick;
/// private replies are sent bare. Send failures are logged, not propagated:
/// a handler has nowhere else to report them.
#[derive(Clone)]
pub struct Replier {
    sink: Arc<dyn MessageSink>,
    target: String,
    sender: String,
}

impl Replier {
    pub fn new(sink: Arc<dyn MessageSink>, invocation: &Invocation) -> Self {
        Self {
            sink,
            target: invocation.reply_target.clone(),
            sender: invocation.sender.clone(),
        }
    }

    /// Send one line to the bound target.
    pub async fn send(&self, text: &str) {
        let line = if self.target == self.sender {
            text.to_string()
        } else {
            format!("({}) {}", self.sender, text)
        };
        if let Err(e) = self.sink.send_line(&self.target, &line).await {
            warn!(target = %self.target, error = %e, "failed to send reply");
        }
    }
}

/// A registered command: metadata plus the handler.
#[async_trait]
pub trait BotCommand: Send + Sync {
    /// Command name; matched case-sensitively.
    fn name(&self) -> &'static str;

    /// One-line help text.
    fn help(&self) -> &'static str;

    fn policy(&self) -> Policy;

    /// Handle one invocation. Must reply exactly once on every path.
    async fn run(&self, invocation: Invocation, replier: Replier);
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    fn invocation(reply_target: &str, sender: &str) -> Invocation {
        Invocation {
            command: "eval".into(),
            args: String::new(),
            reply_target: reply_target.into(),
            sender: sender.into(),
        }
    }

    #[tokio::test]
    async fn channel_replies_are_attributed() {
        let sink = Arc::new(RecordingSink::default());
        let replier = Replier::new(sink.clone(), &invocation("#go-nuts", "alice"));
        replier.send("hello").await;
        assert_eq!(
            sink.taken(),
            vec![("#go-nuts".to_string(), "(alice) hello".to_string())]
        );
    }

    #[tokio::test]
    async fn private_replies_are_bare() {
        let sink = Arc::new(RecordingSink::default());
        let replier = Replier::new(sink.clone(), &invocation("alice", "alice"));
        replier.send("hello").await;
        assert_eq!(sink.taken(), vec![("alice".to_string(), "hello".to_string())]);
    }
}
