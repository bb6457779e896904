//! BranchSight Preprocess
//!
//! Configuration-coverage preprocessing for C/C++ translation units. One raw
//! source stream goes in; one preprocessed variant per reachable
//! conditional-compilation configuration comes out, so downstream analysis
//! sees every code path rather than the single one a compiler would pick.
//!
//! ## Modules
//!
//! - `cleaner` - comment stripping, whitespace normalization, continuation folding
//! - `directive` - shared conditional-directive scanner
//! - `configs` - configuration enumeration and matching
//! - `select` - per-configuration variant selection
//! - `expand` - textual macro expansion
//! - `parallel` - parallel multi-file driver using rayon

pub mod cleaner;
pub mod configs;
pub mod directive;
pub mod expand;
pub mod parallel;
pub mod select;

pub use cleaner::clean;
pub use configs::{enumerate_configurations, matches_configuration};
pub use expand::expand_macros;
pub use select::select_configuration;

use branchsight_core::Result;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

/// Result of the clean-and-expand front half of preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Cleaned and macro-expanded text
    pub code: String,
    /// Reachable configurations, in discovery order; `""` is always first
    pub configurations: Vec<String>,
}

/// The preprocessing engine.
///
/// Stateless: every invocation builds fresh buffers, so one instance may be
/// shared freely across threads processing distinct translation units.
#[derive(Debug, Default)]
pub struct Preprocessor;

impl Preprocessor {
    /// Create a new preprocessor
    pub fn new() -> Self {
        Self
    }

    /// Preprocess a source stream into a map from configuration string to
    /// variant text. The map always contains at least the key `""`.
    pub fn preprocess<R: Read>(&self, input: R) -> Result<BTreeMap<String, String>> {
        let result = self.preprocess_split(input)?;
        let mut variants = BTreeMap::new();
        for cfg in &result.configurations {
            variants.insert(cfg.clone(), select_configuration(&result.code, cfg));
        }
        Ok(variants)
    }

    /// Preprocess a source stream into the cleaned-and-expanded intermediate
    /// plus the configuration list, letting the caller select variants
    /// lazily with [`select_configuration`].
    pub fn preprocess_split<R: Read>(&self, input: R) -> Result<PreprocessResult> {
        let code = clean(input)?;
        let code = expand_macros(code);
        let configurations = enumerate_configurations(&code);
        debug!(
            "preprocessed {} lines into {} configurations",
            code.matches('\n').count(),
            configurations.len()
        );
        Ok(PreprocessResult {
            code,
            configurations,
        })
    }
}
