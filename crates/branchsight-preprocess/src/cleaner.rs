//! Source cleaner
//!
//! Turns raw translation-unit bytes into the canonical cleaned text the rest
//! of the engine operates on: comments stripped, whitespace collapsed, line
//! continuations folded, and the restricted `#if defined(X)` form rewritten
//! to `#ifdef X`. Line numbering is preserved throughout so diagnostics made
//! on any preprocessed variant map back to the raw source.

use branchsight_core::Result;
use regex::Regex;
use std::io::Read;

/// Clean a raw byte stream into canonical text.
///
/// The stream is read to exhaustion before any transformation begins. The
/// cleaner never fails on malformed input; unterminated comments and literals
/// simply consume to end of stream.
pub fn clean<R: Read>(mut input: R) -> Result<String> {
    let mut raw = Vec::new();
    input.read_to_end(&mut raw)?;
    Ok(clean_bytes(&raw))
}

/// Clean an in-memory buffer. See [`clean`].
pub fn clean_bytes(raw: &[u8]) -> String {
    let code = scan(raw);
    let code = postprocess(code);
    rewrite_if_defined(&code)
}

/// Character-level pass: drop high-bit bytes, normalize whitespace, collapse
/// space runs, strip comments, copy literals verbatim.
fn scan(raw: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(raw.len());
    // Collapses runs of spaces; also true after `#` and `/` so that
    // `#  ifdef` and the slash peeked at below read cleanly.
    let mut ignore_space = true;
    let mut i = 0;

    while i < raw.len() {
        let byte = raw[i];
        i += 1;

        if byte & 0x80 != 0 {
            continue;
        }

        let mut ch = byte;
        if ch != b'\n' && (ch.is_ascii_whitespace() || ch.is_ascii_control()) {
            ch = b' ';
        }

        if ch == b' ' && ignore_space {
            continue;
        }
        ignore_space = matches!(ch, b' ' | b'#' | b'/');

        match ch {
            b'/' => match raw.get(i).copied() {
                Some(b'/') => {
                    i += 1;
                    let mut saw_newline = false;
                    while i < raw.len() {
                        let c = raw[i];
                        i += 1;
                        if c == b'\n' {
                            saw_newline = true;
                            break;
                        }
                    }
                    if saw_newline {
                        out.push(b'\n');
                    }
                }
                Some(b'*') => {
                    i += 1;
                    let mut prev = 0u8;
                    let mut cur = b'/';
                    while !(prev == b'*' && cur == b'/') {
                        match raw.get(i).copied() {
                            None => break,
                            Some(c) => {
                                prev = cur;
                                cur = c;
                                i += 1;
                                if c == b'\n' {
                                    out.push(b'\n');
                                }
                            }
                        }
                    }
                }
                Some(next) => {
                    // Not a comment: emit the pair verbatim.
                    i += 1;
                    out.push(b'/');
                    out.push(next);
                }
                None => out.push(b'/'),
            },
            b'"' => {
                out.push(b'"');
                while i < raw.len() {
                    let c = raw[i];
                    i += 1;
                    out.push(c);
                    if c == b'\\' {
                        // Escaped byte copied verbatim, and the close check
                        // skipped so "\"" does not end the literal.
                        if i < raw.len() {
                            out.push(raw[i]);
                            i += 1;
                        }
                        continue;
                    }
                    if c == b'"' {
                        break;
                    }
                }
            }
            b'\'' => {
                out.push(b'\'');
                if i < raw.len() {
                    let c = raw[i];
                    i += 1;
                    out.push(c);
                    if c == b'\\' && i < raw.len() {
                        out.push(raw[i]);
                        i += 1;
                    }
                }
                // Presumed closing quote; no validation of length.
                if i < raw.len() {
                    i += 1;
                }
                out.push(b'\'');
            }
            _ => out.push(ch),
        }
    }

    // High-bit bytes survive only inside literals; for valid-UTF-8 input the
    // conversion is lossless.
    String::from_utf8_lossy(&out).into_owned()
}

/// Whole-text passes run after the character scan, in order: tabs to spaces,
/// first-line indentation, spaces adjacent to newlines, continuation folding.
fn postprocess(code: String) -> String {
    let code = code.replace('\t', " ");
    let code = code.trim_start_matches(' ').to_string();
    let code = strip_space_near_newlines(&code);
    fold_continuations(code)
}

/// Remove any space with a `\n` on either side of it.
fn strip_space_near_newlines(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' && (out.ends_with('\n') || chars.peek() == Some(&'\n')) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Fold `\` + newline pairs. A space is inserted at the join unless one is
/// already there, and a compensating blank line is appended at the next
/// newline so the total line count is unchanged.
fn fold_continuations(mut code: String) -> String {
    while let Some(loc) = code.rfind("\\\n") {
        code.replace_range(loc..loc + 2, "");
        let mut loc = loc;
        if loc > 0 && code.as_bytes()[loc - 1] != b' ' {
            code.insert(loc, ' ');
            loc += 1;
        }
        if let Some(nl) = code[loc..].find('\n') {
            code.insert(loc + nl, '\n');
        }
    }
    code
}

/// Rewrite `#if defined(X)` to `#ifdef X`.
///
/// Only the restricted single-test form ending the line is recognized; the
/// first `)` must come immediately before the newline. Compound expressions
/// are left untouched and fall through to the directive parser as opaque
/// identifiers.
fn rewrite_if_defined(code: &str) -> String {
    let re = Regex::new(r"#if defined\(([^)\n]*)\)\n").expect("static pattern");
    re.replace_all(code, "#ifdef $1\n").into_owned()
}
