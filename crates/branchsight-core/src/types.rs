//! Core type definitions

use serde::{Deserialize, Serialize};

/// One element of the active conditional-compilation stack.
///
/// The directive scanner yields guard names as plain strings, overloading the
/// literal tokens `"0"` and `"1"` as unreachable/always-live sentinels. The
/// stack keeps them as tagged values and only serializes back to the
/// `;`-joined form when a configuration string is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardAtom {
    /// Always live (`"1"`)
    Always,
    /// Unreachable (`"0"`)
    Never,
    /// Guarded by a macro name
    Name(String),
}

impl GuardAtom {
    /// Parse a guard name from a directive line, mapping the sentinel
    /// spellings to their tagged forms.
    pub fn from_name(name: &str) -> Self {
        match name {
            "1" => GuardAtom::Always,
            "0" => GuardAtom::Never,
            _ => GuardAtom::Name(name.to_string()),
        }
    }

    /// The atom a `#else` replaces this one with during enumeration.
    ///
    /// `"1"` and `"0"` swap; a named guard becomes unreachable, since the
    /// else-branch is only taken when the name is undefined.
    pub fn inverted(&self) -> Self {
        match self {
            GuardAtom::Always => GuardAtom::Never,
            GuardAtom::Never => GuardAtom::Always,
            GuardAtom::Name(_) => GuardAtom::Never,
        }
    }
}
