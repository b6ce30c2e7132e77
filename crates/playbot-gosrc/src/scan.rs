//! Minimal lexical scanner shared by the formatter and the import resolver.
//!
//! Tracks whether a character sits in ordinary code or inside a string, rune
//! or raw-string literal, or a comment. Only the distinctions the callers
//! need are modeled; this is not a full Go lexer.

use crate::FormatError;

/// Literal state carried across lines. Strings, runes and line comments
/// cannot span lines in Go; raw strings and block comments can.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexState {
    Normal,
    RawString,
    BlockComment,
}

/// An unterminated single-line literal, reported with the line it started on.
pub(crate) enum LineIssue {
    UnterminatedString,
    UnterminatedRune,
}

/// Scan one line, calling `on_char(c, is_code)` once for every character.
/// `is_code` is true only for characters outside every literal and comment.
/// `state` carries the multi-line literal state to the next line.
pub(crate) fn scan_line(
    state: &mut LexState,
    line: &str,
    mut on_char: impl FnMut(char, bool),
) -> Result<(), LineIssue> {
    enum S {
        Normal,
        Str,
        StrEsc,
        Rune,
        RuneEsc,
        LineComment,
        Raw,
        Block,
    }

    let mut s = match *state {
        LexState::Normal => S::Normal,
        LexState::RawString => S::Raw,
        LexState::BlockComment => S::Block,
    };

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        s = match s {
            S::Normal => match c {
                '"' => {
                    on_char(c, false);
                    S::Str
                }
                '\'' => {
                    on_char(c, false);
                    S::Rune
                }
                '`' => {
                    on_char(c, false);
                    S::Raw
                }
                '/' if chars.peek() == Some(&'/') => {
                    on_char(c, false);
                    if let Some(n) = chars.next() {
                        on_char(n, false);
                    }
                    S::LineComment
                }
                '/' if chars.peek() == Some(&'*') => {
                    on_char(c, false);
                    if let Some(n) = chars.next() {
                        on_char(n, false);
                    }
                    S::Block
                }
                _ => {
                    on_char(c, true);
                    S::Normal
                }
            },
            S::Str => {
                on_char(c, false);
                match c {
                    '\\' => S::StrEsc,
                    '"' => S::Normal,
                    _ => S::Str,
                }
            }
            S::StrEsc => {
                on_char(c, false);
                S::Str
            }
            S::Rune => {
                on_char(c, false);
                match c {
                    '\\' => S::RuneEsc,
                    '\'' => S::Normal,
                    _ => S::Rune,
                }
            }
            S::RuneEsc => {
                on_char(c, false);
                S::Rune
            }
            S::LineComment => {
                on_char(c, false);
                S::LineComment
            }
            S::Raw => {
                on_char(c, false);
                if c == '`' {
                    S::Normal
                } else {
                    S::Raw
                }
            }
            S::Block => {
                on_char(c, false);
                if c == '*' && chars.peek() == Some(&'/') {
                    if let Some(n) = chars.next() {
                        on_char(n, false);
                    }
                    S::Normal
                } else {
                    S::Block
                }
            }
        };
    }

    *state = match s {
        S::Str | S::StrEsc => return Err(LineIssue::UnterminatedString),
        S::Rune | S::RuneEsc => return Err(LineIssue::UnterminatedRune),
        S::Raw => LexState::RawString,
        S::Block => LexState::BlockComment,
        S::Normal | S::LineComment => LexState::Normal,
    };
    Ok(())
}

/// Replace every non-code character with a space, preserving line structure.
///
/// The result has the same line count as the input; identifier scans over it
/// cannot be fooled by strings or comments, and tokens separated by a masked
/// region stay separated.
pub(crate) fn mask_non_code(src: &str) -> Result<String, FormatError> {
    let mut state = LexState::Normal;
    let mut out = String::with_capacity(src.len());
    for (i, line) in src.lines().enumerate() {
        let mut masked = String::with_capacity(line.len());
        scan_line(&mut state, line, |c, is_code| {
            masked.push(if is_code { c } else { ' ' });
        })
        .map_err(|issue| match issue {
            LineIssue::UnterminatedString => FormatError::UnterminatedString { line: i + 1 },
            LineIssue::UnterminatedRune => FormatError::UnterminatedRune { line: i + 1 },
        })?;
        out.push_str(&masked);
        out.push('\n');
    }
    match state {
        LexState::RawString => Err(FormatError::UnterminatedRawString),
        LexState::BlockComment => Err(FormatError::UnterminatedComment),
        LexState::Normal => Ok(out),
    }
}
