//! IRC wire codec: RFC 1459 line parsing and message building.
//!
//! Pure functions only; the socket lives in [`crate::client`]. The builders
//! enforce the protocol's 512-byte line budget (including `\r\n`) so the
//! command layer never has to think about wire-level truncation.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Maximum serialized line length, `\r\n` included.
pub const MAX_LINE_LEN: usize = 512;

const CTCP_DELIM: char = '\x01';

/// A parsed IRC message: `[:prefix] COMMAND [params...] [:trailing]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
    pub trailing: Option<String>,
}

impl Message {
    /// Parse one raw line. Returns `None` for lines with no command token.
    /// Tolerates a missing prefix and a missing trailing part.
    pub fn parse(line: &str) -> Option<Message> {
        let line = line.trim_end_matches(['\r', '\n']);

        let (prefix, rest) = match line.strip_prefix(':') {
            Some(prefixed) => {
                let (prefix, rest) = prefixed.split_once(' ')?;
                (Some(prefix.to_string()), rest)
            }
            None => (None, line),
        };

        let (middle, trailing) = match rest.split_once(" :") {
            Some((middle, trailing)) => (middle, Some(trailing.to_string())),
            None => (rest, None),
        };

        let mut tokens = middle.split_whitespace();
        let command = tokens.next()?.to_string();
        let params = tokens.map(str::to_string).collect();

        Some(Message {
            prefix,
            command,
            params,
            trailing,
        })
    }
}

/// Extract the bare nickname from a `nick!user@host` prefix. A prefix
/// without `!` (a server name) is returned whole.
pub fn nick_of(prefix: &str) -> &str {
    prefix.split('!').next().unwrap_or(prefix)
}

/// Cut `text` to at most `budget` bytes on a UTF-8 boundary.
pub fn truncate_to(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut end = budget;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Build a PRIVMSG, fitting the serialized line into the 512-byte budget.
/// Embedded line breaks are flattened to spaces; a reply is one line.
pub fn privmsg(target: &str, text: &str) -> String {
    let text = text.replace(['\r', '\n'], " ");
    // "PRIVMSG <target> :<text>\r\n"
    let overhead = "PRIVMSG ".len() + target.len() + " :".len() + 2;
    let budget = MAX_LINE_LEN.saturating_sub(overhead);
    format!("PRIVMSG {} :{}", target, truncate_to(&text, budget))
}

pub fn notice(target: &str, text: &str) -> String {
    format!("NOTICE {target} :{text}")
}

pub fn join(channel: &str) -> String {
    format!("JOIN {channel}")
}

pub fn nick(nick: &str) -> String {
    format!("NICK {nick}")
}

pub fn user(user: &str, real_name: &str) -> String {
    format!("USER {user} 0 * :{real_name}")
}

pub fn pong(payload: &str) -> String {
    format!("PONG :{payload}")
}

pub fn pass(password: &str) -> String {
    format!("PASS {password}")
}

pub fn cap_req(capability: &str) -> String {
    format!("CAP REQ :{capability}")
}

pub fn cap_end() -> String {
    "CAP END".to_string()
}

pub fn authenticate(argument: &str) -> String {
    format!("AUTHENTICATE {argument}")
}

/// Base64 payload for SASL PLAIN: `\0user\0password`.
pub fn sasl_plain(user: &str, password: &str) -> String {
    BASE64.encode(format!("\0{user}\0{password}"))
}

/// Whether a PRIVMSG body is a CTCP VERSION query.
pub fn is_ctcp_version(text: &str) -> bool {
    text.strip_prefix(CTCP_DELIM)
        .and_then(|t| t.strip_suffix(CTCP_DELIM))
        .is_some_and(|inner| inner == "VERSION" || inner.starts_with("VERSION "))
}

/// NOTICE carrying the CTCP VERSION reply.
pub fn ctcp_version_reply(target: &str, version: &str) -> String {
    notice(target, &format!("{CTCP_DELIM}VERSION {version}{CTCP_DELIM}"))
}
