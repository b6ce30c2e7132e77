//! The built-in command set: `eval`, `play`, `playrun`, `help`.
//!
//! The set is fixed at compile time. Every handler replies exactly once on
//! every path, including all error paths; errors never propagate past the
//! handler.

use std::sync::Arc;

use async_trait::async_trait;

use playbot_gosrc as gosrc;
use playbot_playground::{locator, PlayClient};

use crate::command::{BotCommand, Invocation, Policy, Replier};
use crate::registry::Registry;
use crate::render;

/// Build the registry with the full built-in command set. `prefix` only
/// appears in help text.
pub fn register_builtins(play: Arc<PlayClient>, prefix: &str) -> Registry {
    let mut registry = Registry::new();
    registry.insert(Arc::new(EvalCommand { play: play.clone() }));
    registry.insert(Arc::new(PlayCommand { play: play.clone() }));
    registry.insert(Arc::new(PlayRunCommand { play }));

    let mut entries: Vec<(String, String)> = registry
        .help_entries()
        .into_iter()
        .map(|(name, help)| (name.to_string(), help.to_string()))
        .collect();
    entries.push(("help".to_string(), HELP_HELP.to_string()));
    entries.sort();

    registry.insert(Arc::new(HelpCommand {
        prefix: prefix.to_string(),
        entries,
    }));
    registry
}

// ---------------------------------------------------------------------------
// eval
// ---------------------------------------------------------------------------

struct EvalCommand {
    play: Arc<PlayClient>,
}

#[async_trait]
impl BotCommand for EvalCommand {
    fn name(&self) -> &'static str {
        "eval"
    }

    fn help(&self) -> &'static str {
        "Evaluates Go code on the Go Playground and replies with the first line of output. \
         Takes a function body or a full program."
    }

    fn policy(&self) -> Policy {
        Policy::Concurrent
    }

    async fn run(&self, invocation: Invocation, replier: Replier) {
        let code = invocation.args.trim();
        if code.is_empty() {
            replier.send("Cannot eval empty code").await;
            return;
        }

        let processed = if gosrc::has_package_clause(code) {
            gosrc::process_program(code)
        } else {
            gosrc::process_body(code)
        };
        let src = match processed {
            Ok(src) => src,
            Err(e) => {
                replier.send(&format!("Error occurred: {e}")).await;
                return;
            }
        };

        // Share-link failure degrades to the placeholder; it never blocks
        // execution.
        let share = self.play.share(&src).await;
        let response = match self.play.compile(&src).await {
            Ok(response) => response,
            Err(e) => {
                replier.send(&format!("Error occurred: {e}")).await;
                return;
            }
        };
        replier.send(&render::render_run(&response, share.as_deref())).await;
    }
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

struct PlayCommand {
    play: Arc<PlayClient>,
}

#[async_trait]
impl BotCommand for PlayCommand {
    fn name(&self) -> &'static str {
        "play"
    }

    fn help(&self) -> &'static str {
        "Checks whether a play.golang.org snippet compiles. Takes a snippet URL or id."
    }

    fn policy(&self) -> Policy {
        Policy::Concurrent
    }

    async fn run(&self, invocation: Invocation, replier: Replier) {
        let reference = invocation.args.trim();
        if reference.is_empty() {
            replier.send("Cannot parse an empty link / URL").await;
            return;
        }
        let src = match locator::fetch_snippet(&self.play, reference).await {
            Ok(src) => src,
            Err(e) => {
                replier.send(&format!("Unable to get snippet: {e}")).await;
                return;
            }
        };
        let response = match self.play.compile(&src).await {
            Ok(response) => response,
            Err(e) => {
                replier.send(&format!("Unable to start compile: {e}")).await;
                return;
            }
        };
        if response.errors.is_empty() {
            replier.send("No errors in file").await;
        } else {
            replier.send(&format!("Errors: {}", response.errors.trim())).await;
        }
    }
}

// ---------------------------------------------------------------------------
// playrun
// ---------------------------------------------------------------------------

struct PlayRunCommand {
    play: Arc<PlayClient>,
}

#[async_trait]
impl BotCommand for PlayRunCommand {
    fn name(&self) -> &'static str {
        "playrun"
    }

    fn help(&self) -> &'static str {
        "Runs a play.golang.org snippet and replies with the first line of output. \
         Takes a snippet URL or id."
    }

    fn policy(&self) -> Policy {
        Policy::Concurrent
    }

    async fn run(&self, invocation: Invocation, replier: Replier) {
        let reference = invocation.args.trim();
        if reference.is_empty() {
            replier.send("Cannot parse an empty link / URL").await;
            return;
        }
        let src = match locator::fetch_snippet(&self.play, reference).await {
            Ok(src) => src,
            Err(e) => {
                replier.send(&format!("Unable to get snippet: {e}")).await;
                return;
            }
        };
        let response = match self.play.compile(&src).await {
            Ok(response) => response,
            Err(e) => {
                replier.send(&format!("Unable to start compile: {e}")).await;
                return;
            }
        };
        if !response.errors.is_empty() {
            replier
                .send(&format!("Compile failed! {}", response.errors.trim()))
                .await;
        } else if response.events.is_empty() {
            replier.send(render::NO_OUTPUT).await;
        } else {
            replier
                .send(&format!("Complete: {}", render::render_events(&response.events)))
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

const HELP_HELP: &str = "Lists the available commands, or shows the help text for one command.";

struct HelpCommand {
    prefix: String,
    entries: Vec<(String, String)>,
}

#[async_trait]
impl BotCommand for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn help(&self) -> &'static str {
        HELP_HELP
    }

    /// Purely local; safe to run inline.
    fn policy(&self) -> Policy {
        Policy::Sequential
    }

    async fn run(&self, invocation: Invocation, replier: Replier) {
        let name = invocation.args.trim();
        if name.is_empty() {
            let names: Vec<&str> = self.entries.iter().map(|(n, _)| n.as_str()).collect();
            replier
                .send(&format!(
                    "Available Commands (use {}help $cmd for more info): {}",
                    self.prefix,
                    names.join(", ")
                ))
                .await;
            return;
        }
        match self.entries.iter().find(|(n, _)| n == name) {
            Some((_, help)) => replier.send(&format!("Help for \"{name}\": {help}")).await,
            None => replier.send(&format!("Unknown command \"{name}\"")).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::RecordingSink;

    fn replier(sink: &Arc<RecordingSink>) -> Replier {
        Replier::new(
            sink.clone(),
            &Invocation {
                command: String::new(),
                args: String::new(),
                reply_target: "alice".into(),
                sender: "alice".into(),
            },
        )
    }

    fn invocation(args: &str) -> Invocation {
        Invocation {
            command: String::new(),
            args: args.into(),
            reply_target: "alice".into(),
            sender: "alice".into(),
        }
    }

    /// A help command carrying the same entries the registered one does.
    fn help_command() -> HelpCommand {
        let play = Arc::new(PlayClient::with_base_url("http://127.0.0.1:1"));
        let registry = register_builtins(play, "~");
        assert!(registry.lookup("help").is_some());
        let entries = registry
            .help_entries()
            .into_iter()
            .map(|(n, h)| (n.to_string(), h.to_string()))
            .collect();
        HelpCommand {
            prefix: "~".into(),
            entries,
        }
    }

    #[test]
    fn builtins_register_the_fixed_command_set() {
        let play = Arc::new(PlayClient::with_base_url("http://127.0.0.1:1"));
        let registry = register_builtins(play, "~");
        assert_eq!(registry.names(), vec!["eval", "help", "play", "playrun"]);
    }

    #[tokio::test]
    async fn help_without_args_lists_all_commands_once() {
        let sink = Arc::new(RecordingSink::default());
        help_command().run(invocation(""), replier(&sink)).await;

        let lines = sink.taken();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].1,
            "Available Commands (use ~help $cmd for more info): eval, help, play, playrun"
        );
    }

    #[tokio::test]
    async fn help_with_known_name_shows_its_text() {
        let sink = Arc::new(RecordingSink::default());
        help_command().run(invocation("playrun"), replier(&sink)).await;

        let lines = sink.taken();
        assert!(lines[0].1.starts_with("Help for \"playrun\": Runs a play.golang.org"));
    }

    #[tokio::test]
    async fn help_with_unknown_name_says_so() {
        let sink = Arc::new(RecordingSink::default());
        help_command().run(invocation("frobnicate"), replier(&sink)).await;

        assert_eq!(sink.taken()[0].1, "Unknown command \"frobnicate\"");
    }

    #[tokio::test]
    async fn eval_rejects_whitespace_only_code_without_network() {
        // Unroutable base URL: any network call would error differently.
        let play = Arc::new(PlayClient::with_base_url("http://127.0.0.1:1"));
        let eval = EvalCommand { play };
        let sink = Arc::new(RecordingSink::default());
        eval.run(invocation("   \t  "), replier(&sink)).await;

        assert_eq!(sink.taken(), vec![("alice".into(), "Cannot eval empty code".into())]);
    }

    #[tokio::test]
    async fn eval_reports_format_errors_and_stops() {
        let play = Arc::new(PlayClient::with_base_url("http://127.0.0.1:1"));
        let eval = EvalCommand { play };
        let sink = Arc::new(RecordingSink::default());
        eval.run(invocation("fmt.Println(1"), replier(&sink)).await;

        let lines = sink.taken();
        assert_eq!(lines.len(), 1, "exactly one reply even on error");
        assert!(lines[0].1.starts_with("Error occurred: "));
    }

    #[tokio::test]
    async fn play_rejects_empty_reference() {
        let play = Arc::new(PlayClient::with_base_url("http://127.0.0.1:1"));
        let play_cmd = PlayCommand { play };
        let sink = Arc::new(RecordingSink::default());
        play_cmd.run(invocation(""), replier(&sink)).await;

        assert_eq!(
            sink.taken(),
            vec![("alice".into(), "Cannot parse an empty link / URL".into())]
        );
    }

    #[tokio::test]
    async fn playrun_reports_unresolvable_references() {
        let play = Arc::new(PlayClient::with_base_url("http://127.0.0.1:1"));
        let playrun = PlayRunCommand { play };
        let sink = Arc::new(RecordingSink::default());
        playrun.run(invocation("not a link"), replier(&sink)).await;

        let lines = sink.taken();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].1,
            "Unable to get snippet: not a playground snippet link or id"
        );
    }
}
