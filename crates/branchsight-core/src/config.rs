//! Engine configuration types

use serde::{Deserialize, Serialize};
use std::path::Path;

/// BranchSight engine configuration
///
/// Controls which files the directory drivers pick up. The preprocessing
/// passes themselves take no tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// File extensions to treat as C/C++ sources
    pub extensions: Vec<String>,

    /// Directory names to exclude when scanning
    pub exclude_dirs: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                "c".into(),
                "h".into(),
                "cc".into(),
                "cpp".into(),
                "cxx".into(),
                "hpp".into(),
            ],
            exclude_dirs: vec![".git".into(), "build".into(), "node_modules".into()],
        }
    }
}

impl EngineConfig {
    /// Whether a path has one of the configured source extensions
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    /// Whether a path contains an excluded directory component
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|c| {
            c.as_os_str()
                .to_str()
                .map(|name| self.exclude_dirs.iter().any(|d| d == name))
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_extensions() {
        let config = EngineConfig::default();
        assert!(config.matches_extension(&PathBuf::from("driver.c")));
        assert!(config.matches_extension(&PathBuf::from("driver.hpp")));
        assert!(!config.matches_extension(&PathBuf::from("driver.rs")));
        assert!(!config.matches_extension(&PathBuf::from("Makefile")));
    }

    #[test]
    fn test_excluded_dirs() {
        let config = EngineConfig::default();
        assert!(config.is_excluded(&PathBuf::from("project/.git/hooks/pre-commit")));
        assert!(config.is_excluded(&PathBuf::from("build/out.c")));
        assert!(!config.is_excluded(&PathBuf::from("src/main.c")));
    }
}
