//! Go snippet transformation.
//!
//! Turns raw user text into a runnable Go program: wraps ad-hoc function
//! bodies in a `package main` skeleton, resolves unambiguous standard-library
//! imports, and applies a canonical, idempotent formatting pass. Everything
//! here is pure text transformation; nothing touches the network.

mod scan;

pub mod format;
pub mod imports;

pub use format::format;
pub use imports::resolve_imports;

/// Errors from snippet transformation.
///
/// Any of these means the snippet must not be sent to the execution
/// service; the diagnostic is relayed to the user instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: unterminated rune literal")]
    UnterminatedRune { line: usize },

    #[error("unterminated raw string literal")]
    UnterminatedRawString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("line {line}: unexpected closing '{found}'")]
    UnbalancedClose { line: usize, found: char },

    #[error("missing {count} closing delimiter(s) at end of snippet")]
    UnbalancedOpen { count: usize },
}

/// True when the snippet is already a full program (its first significant
/// code is a `package` clause) rather than a bare function body. Comments
/// of either kind before the clause are skipped.
pub fn has_package_clause(src: &str) -> bool {
    let mut state = scan::LexState::Normal;
    for line in src.lines() {
        let mut code = String::new();
        let scanned = scan::scan_line(&mut state, line, |c, is_code| {
            if is_code {
                code.push(c);
            }
        });
        if scanned.is_err() {
            return false;
        }
        let t = code.trim();
        if t.is_empty() {
            continue;
        }
        return t == "package" || t.starts_with("package ");
    }
    false
}

/// Enclose an ad-hoc function body in the canonical program skeleton.
///
/// Indentation is left to [`format`], which runs after import resolution.
pub fn wrap_body(body: &str) -> String {
    let mut src = String::from("package main\n\nfunc main() {\n");
    src.push_str(body);
    if !body.ends_with('\n') {
        src.push('\n');
    }
    src.push_str("}\n");
    src
}

/// Transform an ad-hoc function body into formatted, import-resolved source.
pub fn process_body(body: &str) -> Result<String, FormatError> {
    format(&resolve_imports(&wrap_body(body))?)
}

/// Transform a full program into formatted, import-resolved source.
pub fn process_program(src: &str) -> Result<String, FormatError> {
    format(&resolve_imports(src)?)
}
