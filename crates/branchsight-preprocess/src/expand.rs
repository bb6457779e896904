//! Macro expander
//!
//! Finds each `#define` in cleaned text, removes it, and substitutes its body
//! textually at every call site from the definition onward. Expansion is a
//! single left-to-right pass per definition: inserted text is never rescanned,
//! later definitions shadow earlier ones only from their own point onward,
//! and a definition never reaches code before it.
//!
//! Non-conforming by design: no recursion, no `#`/`##`, no variadics, no
//! self-reference detection. Coverage breadth across configurations matters
//! here, not ISO fidelity.

use branchsight_core::tokenizer::{tokenize, Token};
use tracing::debug;

/// A parsed `#define`.
#[derive(Debug)]
struct MacroDef {
    name: String,
    /// Formal parameter names; meaningful only when `function_like`.
    params: Vec<String>,
    /// Replacement token list.
    body: Vec<Token>,
    /// `(` immediately followed the name, with no intervening space.
    function_like: bool,
}

impl MacroDef {
    /// Parse one definition body (the text after `#define `).
    fn parse(text: &str) -> Option<MacroDef> {
        let tokens = tokenize(text);
        let first = tokens.first()?;
        let name = first.text.clone();

        let function_like = text.as_bytes().get(name.len()) == Some(&b'(');
        if !function_like {
            return Some(MacroDef {
                name,
                params: Vec::new(),
                body: tokens[1..].to_vec(),
                function_like,
            });
        }

        let mut params = Vec::new();
        let mut body_start = tokens.len();
        for (i, tok) in tokens.iter().enumerate().skip(2) {
            if tok.text == ")" {
                body_start = i + 1;
                break;
            }
            if tok.is_name() {
                params.push(tok.text.clone());
            }
        }

        Some(MacroDef {
            name,
            params,
            body: tokens[body_start..].to_vec(),
            function_like,
        })
    }

    /// Rebuild the body with `args` substituted for the formals. A single
    /// space separates two adjacent name tokens; nothing else is spaced.
    fn build(&self, args: &[String]) -> String {
        let mut out = String::new();
        for (i, tok) in self.body.iter().enumerate() {
            if tok.is_name() {
                if let Some(p) = self.params.iter().position(|p| *p == tok.text) {
                    out.push_str(&args[p]);
                } else {
                    out.push_str(&tok.text);
                }
            } else {
                out.push_str(&tok.text);
            }
            if tok.is_name() && self.body.get(i + 1).map_or(false, Token::is_name) {
                out.push(' ');
            }
        }
        out
    }
}

/// Parse a parenthesized argument list starting at the `(` at the beginning
/// of `tail`. Nesting is respected; top-level commas split. Returns the
/// argument texts and the byte offset of the closing `)`, or `None` when the
/// list never closes.
fn parse_arguments(tail: &str) -> Option<(Vec<String>, usize)> {
    let mut args = Vec::new();
    let mut arg = String::new();
    let mut level = 0i32;

    for (off, c) in tail.char_indices() {
        if c == '(' {
            level += 1;
            if level == 1 {
                continue;
            }
        } else if c == ')' {
            level -= 1;
            if level <= 0 {
                args.push(arg);
                return Some((args, off));
            }
        }

        if level == 1 && c == ',' {
            args.push(std::mem::take(&mut arg));
        } else if level >= 1 {
            arg.push(c);
        }
    }

    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Expand every `#define` in `code`.
///
/// Each definition line collapses to an empty line (continuations folded into
/// it contribute further empty lines), so line numbering is preserved. A
/// `#define` with no terminating newline discards itself and everything after
/// it. Call sites whose argument count disagrees with the definition are left
/// untouched.
pub fn expand_macros(mut code: String) -> String {
    let mut defpos = 0;
    while let Some(found) = code[defpos..].find("#define") {
        defpos += found;

        // The definition runs to the next newline not escaped by `\`.
        let mut endpos = match code[defpos + 6..].find('\n') {
            Some(p) => defpos + 6 + p,
            None => {
                code.truncate(defpos);
                break;
            }
        };
        loop {
            if code.as_bytes()[endpos - 1] != b'\\' {
                break;
            }
            match code[endpos + 1..].find('\n') {
                Some(p) => endpos = endpos + 1 + p,
                None => {
                    code.truncate(defpos);
                    return code;
                }
            }
        }

        let body_start = (defpos + 8).min(endpos);
        let mut macro_text = code[body_start..endpos].to_string();
        code.replace_range(defpos..endpos, "");

        // Fold continuations out of the definition; each one owes the source
        // a blank line at the definition site.
        while let Some(p) = macro_text.find("\\\n") {
            macro_text.replace_range(p..p + 2, "");
            code.insert(defpos, '\n');
            defpos += 1;
        }

        let Some(def) = MacroDef::parse(&macro_text) else {
            continue;
        };
        debug!("expanding macro {}", def.name);

        let mut pos1 = defpos;
        while let Some(found) = code[pos1 + 1..].find(&def.name) {
            pos1 = pos1 + 1 + found;

            // Must not be the tail of a longer identifier.
            let prev = code.as_bytes()[pos1 - 1];
            if is_ident_byte(prev) {
                continue;
            }

            let pos2 = pos1 + def.name.len();
            let (args, end) = if def.function_like {
                if code.as_bytes().get(pos2) != Some(&b'(') {
                    continue;
                }
                match parse_arguments(&code[pos2..]) {
                    Some((args, close)) => (args, pos2 + close + 1),
                    None => continue,
                }
            } else {
                (Vec::new(), pos2)
            };

            if args.len() != def.params.len() {
                continue;
            }

            let expansion = def.build(&args);
            code.replace_range(pos1..end, &expansion);
            pos1 += expansion.len();
            if pos1 >= code.len() {
                break;
            }
        }
    }

    code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(code: &str) -> String {
        expand_macros(code.to_string())
    }

    #[test]
    fn test_object_like() {
        assert_eq!(expand("#define N 42\nint a=N;"), "\nint a=42;");
    }

    #[test]
    fn test_function_like() {
        assert_eq!(expand("#define SQ(x) x*x\nSQ(3+1)"), "\n3+1*3+1");
    }

    #[test]
    fn test_two_parameters() {
        assert_eq!(
            expand("#define MIN(a,b) a<b?a:b\nx=MIN(p, q+1);"),
            "\nx=p< q+1?p: q+1;"
        );
    }

    #[test]
    fn test_nested_argument_parens() {
        assert_eq!(expand("#define ID(x) x\nID(f(a,b))"), "\nf(a,b)");
    }

    #[test]
    fn test_name_adjacency_spacing() {
        assert_eq!(
            expand("#define DECL(t,n) t n;\nDECL(long,counter)"),
            "\nlong counter;"
        );
    }

    #[test]
    fn test_identifier_suffix_not_replaced() {
        assert_eq!(expand("#define N 1\naN=N;"), "\naN=1;");
    }

    #[test]
    fn test_identifier_prefix_is_replaced() {
        // Only the preceding character is checked; a name that is a prefix
        // of a longer identifier is still substituted.
        assert_eq!(expand("#define N 1\nN2=N;"), "\n12=1;");
    }

    #[test]
    fn test_argument_count_mismatch_skipped() {
        assert_eq!(expand("#define F(a,b) a+b\nF(1)"), "\nF(1)");
    }

    #[test]
    fn test_function_like_requires_parens() {
        assert_eq!(expand("#define F(a) a\nint F;"), "\nint F;");
    }

    #[test]
    fn test_continuation_preserves_lines() {
        assert_eq!(expand("#define A \\\n1\nx=A;"), "\n\nx=1;");
    }

    #[test]
    fn test_no_recursive_expansion() {
        // The inserted text is never rescanned.
        assert_eq!(expand("#define A A+1\nA"), "\nA+1");
    }

    #[test]
    fn test_earlier_macro_rewrites_later_body() {
        // A definition's occurrence scan runs over later #define lines too,
        // so the second body is already rewritten when it is parsed.
        assert_eq!(expand("#define A B\n#define B A\nA B"), "\n\nB B");
    }

    #[test]
    fn test_later_definition_shadows_onward() {
        assert_eq!(expand("#define N 1\nx=N;\n#define N 2\ny=N;"), "\nx=1;\n\ny=2;");
    }

    #[test]
    fn test_definition_without_newline_discarded() {
        assert_eq!(expand("x;\n#define N 42"), "x;\n");
    }

    #[test]
    fn test_empty_definition() {
        assert_eq!(expand("#define\nx\n"), "\nx\n");
    }

    #[test]
    fn test_multiline_invocation() {
        assert_eq!(expand("#define F(a) a;\nF(1\n+2)"), "\n1\n+2;");
    }
}
