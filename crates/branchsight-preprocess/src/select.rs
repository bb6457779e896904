//! Configuration selector
//!
//! Given cleaned text and one configuration string, emits the subset of the
//! text that survives under that configuration. Dead branches and every
//! conditional directive become empty lines, so line numbering is identical
//! across all variants of a translation unit.

use crate::configs::matches_configuration;
use crate::directive::guard_name;

/// Liveness of one open `#if` chain.
#[derive(Debug, Clone, Copy)]
struct BranchState {
    /// The innermost branch currently being walked is live under `cfg`.
    currently_live: bool,
    /// Some branch of this chain has already been live; latches so a later
    /// `#elif`/`#else` cannot re-open the chain.
    ever_lived: bool,
}

/// Select the variant of `cleaned` text visible under `cfg`.
///
/// A line is live iff every open branch is live. Directive lines are blanked
/// unconditionally. Unbalanced `#endif`s and `#elif`/`#else` outside any
/// chain are ignored.
pub fn select_configuration(cleaned: &str, cfg: &str) -> String {
    let mut out = String::with_capacity(cleaned.len());
    let mut branches: Vec<BranchState> = Vec::new();
    let mut live = true;

    for line in cleaned.lines() {
        let def = guard_name(line, true);
        let ndef = guard_name(line, false);

        if line.starts_with("#elif ") {
            if let Some(top) = branches.last_mut() {
                if top.ever_lived {
                    top.currently_live = false;
                } else if let Some(def) = &def {
                    if matches_configuration(cfg, def) {
                        top.currently_live = true;
                        top.ever_lived = true;
                    }
                }
            }
        } else if let Some(def) = def {
            let hit = matches_configuration(cfg, &def);
            branches.push(BranchState {
                currently_live: hit,
                ever_lived: hit,
            });
        } else if let Some(ndef) = ndef {
            let hit = !matches_configuration(cfg, &ndef);
            branches.push(BranchState {
                currently_live: hit,
                ever_lived: hit,
            });
        } else if line == "#else" {
            if let Some(top) = branches.last_mut() {
                top.currently_live = !top.ever_lived;
            }
        } else if line == "#endif" {
            branches.pop();
        }

        if line.starts_with('#') {
            live = branches.iter().all(|b| b.currently_live);
        }

        let blank = !live
            || line.starts_with("#if")
            || line.starts_with("#else")
            || line.starts_with("#elif")
            || line.starts_with("#endif");
        if !blank {
            out.push_str(line);
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_ifdef() {
        let code = "#ifdef A\nx\n#endif\ny\n";
        assert_eq!(select_configuration(code, "A"), "\nx\n\ny\n");
        assert_eq!(select_configuration(code, ""), "\n\n\ny\n");
    }

    #[test]
    fn test_else_flip() {
        let code = "#ifdef A\nx\n#else\ny\n#endif\n";
        assert_eq!(select_configuration(code, ""), "\n\n\ny\n\n");
        assert_eq!(select_configuration(code, "A"), "\nx\n\n\n\n");
    }

    #[test]
    fn test_ifndef_sense() {
        let code = "#ifndef A\nx\n#endif\n";
        assert_eq!(select_configuration(code, ""), "\nx\n\n");
        assert_eq!(select_configuration(code, "A"), "\n\n\n");
    }

    #[test]
    fn test_elif_latches() {
        let code = "#ifdef A\na\n#elif B\nb\n#else\nc\n#endif\n";
        assert_eq!(select_configuration(code, "A"), "\na\n\n\n\n\n\n");
        assert_eq!(select_configuration(code, "B"), "\n\n\nb\n\n\n\n");
        assert_eq!(select_configuration(code, ""), "\n\n\n\n\nc\n\n");
        // Both guards active: the first branch wins and latches.
        assert_eq!(select_configuration(code, "A;B"), "\na\n\n\n\n\n\n");
    }

    #[test]
    fn test_nested_conjunction() {
        let code = "#ifdef A\n#ifdef B\nx\n#endif\ny\n#endif\n";
        assert_eq!(select_configuration(code, "A;B"), "\n\nx\n\ny\n\n");
        assert_eq!(select_configuration(code, "A"), "\n\n\n\ny\n\n");
        assert_eq!(select_configuration(code, "B"), "\n\n\n\n\n\n");
    }

    #[test]
    fn test_sentinel_if_zero() {
        let code = "#if 0\nx\n#endif\ny\n";
        assert_eq!(select_configuration(code, ""), "\n\n\ny\n");
        assert_eq!(select_configuration(code, "X"), "\n\n\ny\n");
    }

    #[test]
    fn test_other_directives_survive() {
        let code = "#include <a.h>\n#ifdef A\n#include <b.h>\n#endif\n";
        assert_eq!(
            select_configuration(code, "A"),
            "#include <a.h>\n\n#include <b.h>\n\n"
        );
        assert_eq!(select_configuration(code, ""), "#include <a.h>\n\n\n\n");
    }

    #[test]
    fn test_unbalanced_endif_ignored() {
        let code = "#endif\nx\n";
        assert_eq!(select_configuration(code, ""), "\nx\n");
    }

    #[test]
    fn test_elif_without_chain_ignored() {
        let code = "#elif A\nx\n";
        assert_eq!(select_configuration(code, "A"), "\nx\n");
    }

    #[test]
    fn test_line_count_preserved() {
        let code = "#ifdef A\nx\n#else\ny\n#endif\nz\n";
        for cfg in ["", "A", "B"] {
            assert_eq!(
                select_configuration(code, cfg).matches('\n').count(),
                code.matches('\n').count()
            );
        }
    }
}
