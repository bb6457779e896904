//! Configuration enumeration and matching
//!
//! The enumerator walks the cleaned text once, maintaining the guard stack,
//! and emits every distinct `;`-joined guard conjunction under which any code
//! is reached. The matcher decides, for one configuration string and one
//! guard atom, whether a branch is live.

use crate::directive::guard_name;
use branchsight_core::GuardAtom;
use tracing::debug;

/// Serialize the guard stack to a configuration string: atoms join on `;`,
/// always-live atoms are omitted, and an unreachable atom ends the string at
/// whatever was accumulated before it.
fn join_guards(guards: &[GuardAtom]) -> String {
    let mut joined = String::new();
    for atom in guards {
        match atom {
            GuardAtom::Never => break,
            GuardAtom::Always => continue,
            GuardAtom::Name(name) => {
                if !joined.is_empty() {
                    joined.push(';');
                }
                joined.push_str(name);
            }
        }
    }
    joined
}

/// Enumerate the distinct configurations reachable in cleaned text.
///
/// The empty configuration is seeded first and is therefore always present.
/// Unbalanced `#endif`s and `#elif`s on an empty stack are ignored; unclosed
/// guards simply leak into every configuration emitted after them.
pub fn enumerate_configurations(cleaned: &str) -> Vec<String> {
    let mut configs = vec![String::new()];
    let mut guards: Vec<GuardAtom> = Vec::new();

    let add_current = |guards: &[GuardAtom], configs: &mut Vec<String>| {
        let joined = join_guards(guards);
        if !configs.contains(&joined) {
            configs.push(joined);
        }
    };

    for line in cleaned.lines() {
        let def = guard_name(line, true).or_else(|| guard_name(line, false));
        if let Some(def) = def {
            if !guards.is_empty() && line.starts_with("#elif ") {
                guards.pop();
            }
            guards.push(GuardAtom::from_name(&def));
            add_current(&guards, &mut configs);
        }

        if line.starts_with("#else") {
            if let Some(top) = guards.last_mut() {
                *top = top.inverted();
                add_current(&guards, &mut configs);
            }
        }

        if line.starts_with("#endif") {
            guards.pop();
        }
    }

    debug!("enumerated {} configurations", configs.len());
    configs
}

/// Decide whether a guard atom is live under a configuration string.
///
/// The sentinels decide unconditionally; otherwise the atom must equal one of
/// the `;`-separated components. The empty configuration matches no named
/// guard.
pub fn matches_configuration(cfg: &str, def: &str) -> bool {
    match def {
        "0" => false,
        "1" => true,
        _ => !cfg.is_empty() && cfg.split(';').any(|part| part == def),
    }
}
