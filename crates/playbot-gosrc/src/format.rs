//! Canonical source formatting.
//!
//! Not gofmt: a stable subset good enough for snippets pasted into chat.
//! Indentation is one tab per open delimiter, line edges are trimmed, blank
//! runs collapse to a single line, and output ends with exactly one newline.
//! Raw-string and block-comment interiors pass through untouched. Formatting
//! is idempotent: formatting already-formatted text is byte-identical.

use crate::scan::{scan_line, LexState, LineIssue};
use crate::FormatError;

/// Format Go source canonically, or fail with a line-numbered diagnostic
/// for unbalanced delimiters and unterminated literals.
pub fn format(src: &str) -> Result<String, FormatError> {
    let mut state = LexState::Normal;
    let mut depth: usize = 0;
    let mut lines: Vec<String> = Vec::new();

    for (i, line) in src.lines().enumerate() {
        let line_no = i + 1;
        let started_in_literal = state != LexState::Normal;

        // Masked copy of the line: code characters verbatim, everything
        // inside literals and comments replaced with spaces.
        let mut code = String::with_capacity(line.len());
        scan_line(&mut state, line, |c, is_code| {
            code.push(if is_code { c } else { ' ' });
        })
        .map_err(|issue| match issue {
            LineIssue::UnterminatedString => FormatError::UnterminatedString { line: line_no },
            LineIssue::UnterminatedRune => FormatError::UnterminatedRune { line: line_no },
        })?;

        if started_in_literal {
            // Interior of a raw string or block comment: verbatim.
            lines.push(line.to_string());
        } else if line.trim().is_empty() {
            if matches!(lines.last(), Some(prev) if !prev.is_empty()) {
                lines.push(String::new());
            }
        } else {
            let leading_closers = code
                .trim_start()
                .chars()
                .take_while(|c| matches!(c, ')' | ']' | '}'))
                .count();
            let indent = depth.saturating_sub(leading_closers);
            // A line that opens a raw string keeps its tail: the trailing
            // whitespace is literal content.
            let body = if state == LexState::Normal {
                line.trim()
            } else {
                line.trim_start()
            };
            let mut rendered = "\t".repeat(indent);
            rendered.push_str(body);
            lines.push(rendered);
        }

        for c in code.chars() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(FormatError::UnbalancedClose { line: line_no, found: c })?;
                }
                _ => {}
            }
        }
    }

    match state {
        LexState::RawString => return Err(FormatError::UnterminatedRawString),
        LexState::BlockComment => return Err(FormatError::UnterminatedComment),
        LexState::Normal => {}
    }
    if depth != 0 {
        return Err(FormatError::UnbalancedOpen { count: depth });
    }

    while matches!(lines.last(), Some(l) if l.is_empty()) {
        lines.pop();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str =
        "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {\n\tfmt.Println(1)\n}\n";

    #[test]
    fn canonical_input_is_a_fixed_point() {
        assert_eq!(format(CANONICAL).unwrap(), CANONICAL);
    }

    #[test]
    fn format_is_idempotent_on_messy_input() {
        let messy = "package main\nfunc main() {\n      x := 1\n\n\n\n  fmt.Println(x)   \n}";
        let once = format(messy).unwrap();
        assert_eq!(format(&once).unwrap(), once);
    }

    #[test]
    fn reindents_from_delimiter_depth() {
        let out = format("func f() {\nif true {\ng(\n1,\n)\n}\n}\n").unwrap();
        assert_eq!(out, "func f() {\n\tif true {\n\t\tg(\n\t\t\t1,\n\t\t)\n\t}\n}\n");
    }

    #[test]
    fn collapses_blank_runs_and_trailing_blanks() {
        let out = format("a()\n\n\n\nb()\n\n\n").unwrap();
        assert_eq!(out, "a()\n\nb()\n");
    }

    #[test]
    fn leading_close_brace_dedents_its_own_line() {
        let out = format("x := m{\n\"k\": 1,\n}\n").unwrap();
        assert_eq!(out, "x := m{\n\t\"k\": 1,\n}\n");
    }

    #[test]
    fn raw_string_interior_is_untouched() {
        let src = "s := `line one\n   spaced   \n}`\nf(s)\n";
        let out = format(src).unwrap();
        assert_eq!(out, "s := `line one\n   spaced   \n}`\nf(s)\n");
        assert_eq!(format(&out).unwrap(), out);
    }

    #[test]
    fn delimiters_inside_strings_do_not_count() {
        let out = format("f(\"}}}\")\n").unwrap();
        assert_eq!(out, "f(\"}}}\")\n");
    }

    #[test]
    fn unbalanced_close_reports_the_line() {
        let err = format("a()\n}\n").unwrap_err();
        assert_eq!(err, FormatError::UnbalancedClose { line: 2, found: '}' });
    }

    #[test]
    fn unbalanced_open_is_reported_at_eof() {
        let err = format("f(\ng(\n").unwrap_err();
        assert_eq!(err, FormatError::UnbalancedOpen { count: 2 });
    }

    #[test]
    fn unterminated_string_reports_the_line() {
        let err = format("ok := 1\ns := \"oops\n").unwrap_err();
        assert_eq!(err, FormatError::UnterminatedString { line: 2 });
    }

    #[test]
    fn empty_input_formats_to_a_single_newline() {
        assert_eq!(format("").unwrap(), "\n");
        assert_eq!(format("\n\n\n").unwrap(), "\n");
    }
}
