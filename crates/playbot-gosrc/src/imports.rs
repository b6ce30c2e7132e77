//! Standard-library import resolution.
//!
//! Scans for qualified references like `fmt.Println` outside strings and
//! comments, maps each qualifier through a table of unambiguously named
//! standard-library packages, merges the result with imports the source
//! already declares, and emits one canonical import block after the
//! `package` clause. Ambiguous names (`rand`, `template`, `pprof`) and
//! unknown qualifiers are left alone for the execution service to report.
//! Third-party packages are never fetched.

use std::collections::{BTreeMap, BTreeSet};

use crate::scan::mask_non_code;
use crate::FormatError;

/// Standard-library packages whose name identifies exactly one import path.
const STDLIB: &[(&str, &str)] = &[
    ("atomic", "sync/atomic"),
    ("base64", "encoding/base64"),
    ("big", "math/big"),
    ("binary", "encoding/binary"),
    ("bits", "math/bits"),
    ("bufio", "bufio"),
    ("bytes", "bytes"),
    ("context", "context"),
    ("csv", "encoding/csv"),
    ("errors", "errors"),
    ("exec", "os/exec"),
    ("filepath", "path/filepath"),
    ("flag", "flag"),
    ("fmt", "fmt"),
    ("hex", "encoding/hex"),
    ("http", "net/http"),
    ("io", "io"),
    ("json", "encoding/json"),
    ("log", "log"),
    ("math", "math"),
    ("net", "net"),
    ("os", "os"),
    ("path", "path"),
    ("reflect", "reflect"),
    ("regexp", "regexp"),
    ("runtime", "runtime"),
    ("sort", "sort"),
    ("strconv", "strconv"),
    ("strings", "strings"),
    ("sync", "sync"),
    ("time", "time"),
    ("unicode", "unicode"),
    ("url", "net/url"),
    ("utf8", "unicode/utf8"),
    ("xml", "encoding/xml"),
];

fn stdlib_path(name: &str) -> Option<&'static str> {
    STDLIB
        .binary_search_by_key(&name, |&(n, _)| n)
        .ok()
        .map(|i| STDLIB[i].1)
}

/// Resolve unresolved standard-library references and rewrite the import
/// block. Source without a `package` clause is returned unchanged.
pub fn resolve_imports(src: &str) -> Result<String, FormatError> {
    let masked = mask_non_code(src)?;
    let masked_lines: Vec<&str> = masked.lines().collect();
    let raw_lines: Vec<&str> = src.lines().collect();

    let Some(package_idx) = masked_lines.iter().position(|l| {
        let t = l.trim();
        t == "package" || t.starts_with("package ")
    }) else {
        return Ok(src.to_string());
    };

    // Existing import declarations: path -> optional alias. Declaration
    // lines are removed and re-emitted as one canonical block.
    let mut entries: BTreeMap<String, Option<String>> = BTreeMap::new();
    let mut is_import_line = vec![false; raw_lines.len()];
    let mut in_block = false;
    for i in package_idx + 1..raw_lines.len() {
        let masked_trim = masked_lines[i].trim();
        if in_block {
            is_import_line[i] = true;
            // The closing paren is code; quoted paths are masked, so a `)`
            // inside a path cannot end the block.
            match masked_lines[i].chars().position(|c| c == ')') {
                Some(at) => {
                    collect_entries(take_chars(raw_lines[i], at), &mut entries);
                    in_block = false;
                }
                None => collect_entries(raw_lines[i], &mut entries),
            }
        } else if masked_trim == "import"
            || masked_trim.starts_with("import ")
            || masked_trim.starts_with("import(")
        {
            is_import_line[i] = true;
            match masked_lines[i].chars().position(|c| c == '(') {
                // Parenthesized form; the block may open and close on this
                // same line (`import ("fmt")`).
                Some(open) => {
                    let interior_raw = skip_chars(raw_lines[i], open + 1);
                    let interior_masked: String =
                        masked_lines[i].chars().skip(open + 1).collect();
                    match interior_masked.chars().position(|c| c == ')') {
                        Some(close) => {
                            collect_entries(take_chars(interior_raw, close), &mut entries);
                        }
                        None => in_block = true,
                    }
                }
                None => {
                    let rest = raw_lines[i].trim_start().trim_start_matches("import");
                    if let Some((alias, path)) = parse_import_entry(rest) {
                        entries.insert(path, alias);
                    }
                }
            }
        }
    }

    // Package names already reachable, via alias or path tail.
    let declared: BTreeSet<String> = entries
        .iter()
        .map(|(path, alias)| match alias {
            Some(a) => a.clone(),
            None => path.rsplit('/').next().unwrap_or(path).to_string(),
        })
        .collect();

    for qualifier in qualified_refs(&masked) {
        if declared.contains(qualifier.as_str()) {
            continue;
        }
        if let Some(path) = stdlib_path(&qualifier) {
            entries.insert(path.to_string(), None);
        }
    }

    let mut out: Vec<String> = Vec::new();
    for line in &raw_lines[..=package_idx] {
        out.push((*line).to_string());
    }
    if !entries.is_empty() {
        out.push(String::new());
        out.push("import (".to_string());
        for (path, alias) in &entries {
            match alias {
                Some(a) => out.push(format!("\t{a} \"{path}\"")),
                None => out.push(format!("\t\"{path}\"")),
            }
        }
        out.push(")".to_string());
    }
    // Re-emit the body with exactly one blank line separating it from the
    // package/import header, so repeated resolution is a fixed point.
    let mut body_started = false;
    for i in package_idx + 1..raw_lines.len() {
        if is_import_line[i] {
            continue;
        }
        if !body_started {
            if raw_lines[i].trim().is_empty() {
                continue;
            }
            out.push(String::new());
            body_started = true;
        }
        out.push(raw_lines[i].to_string());
    }

    let mut result = out.join("\n");
    result.push('\n');
    Ok(result)
}

/// Parse one import entry: an optional alias (including `_` and `.`)
/// followed by a quoted path.
fn parse_import_entry(entry: &str) -> Option<(Option<String>, String)> {
    let entry = entry.trim();
    let start = entry.find('"')?;
    let rest = &entry[start + 1..];
    let end = rest.find('"')?;
    let path = &rest[..end];
    if path.is_empty() {
        return None;
    }
    let alias = entry[..start].trim();
    let alias = if alias.is_empty() {
        None
    } else {
        Some(alias.to_string())
    };
    Some((alias, path.to_string()))
}

/// Parse every entry in a segment of an import declaration. Entries sharing
/// a line are separated by semicolons.
fn collect_entries(segment: &str, entries: &mut BTreeMap<String, Option<String>>) {
    for piece in segment.split(';') {
        if let Some((alias, path)) = parse_import_entry(piece) {
            entries.insert(path, alias);
        }
    }
}

/// First `n` characters of `s`. Positions come from the masked copy, which
/// is aligned with the raw line character for character.
fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((at, _)) => &s[..at],
        None => s,
    }
}

fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((at, _)) => &s[at..],
        None => "",
    }
}

/// Collect identifiers used as qualifiers of an exported name (`qual.Upper`)
/// in masked source.
fn qualified_refs(masked: &str) -> BTreeSet<String> {
    let chars: Vec<char> = masked.chars().collect();
    let mut refs = BTreeSet::new();
    let mut i = 0;
    while i < chars.len() {
        let preceded_by_ident = i > 0 && (is_ident_continue(chars[i - 1]) || chars[i - 1] == '.');
        if is_ident_start(chars[i]) && !preceded_by_ident {
            let start = i;
            while i < chars.len() && is_ident_continue(chars[i]) {
                i += 1;
            }
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_uppercase() {
                refs.insert(chars[start..i].iter().collect());
            }
        } else {
            i += 1;
        }
    }
    refs
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
