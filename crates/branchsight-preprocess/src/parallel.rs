//! Parallel multi-file preprocessing using rayon
//!
//! The engine itself is single-threaded per translation unit; fleet-level
//! parallelism comes from fanning distinct files out across threads here.

use crate::Preprocessor;
use branchsight_core::{EngineConfig, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress event for tracking batch preprocessing
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Batch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Scanning,
    Preprocessing,
    Complete,
}

/// Per-file result of a batch run
pub type FileVariants = (PathBuf, Result<BTreeMap<String, String>>);

/// Parallel preprocessor over many files
pub struct ParallelPreprocessor {
    config: EngineConfig,
    progress_callback: Option<Arc<ProgressCallback>>,
}

impl ParallelPreprocessor {
    /// Create a new parallel preprocessor with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create with a specific engine configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Preprocess multiple files in parallel.
    ///
    /// Per-file failures are returned in place; one unreadable file never
    /// aborts the batch.
    pub fn preprocess_files(&self, paths: &[PathBuf]) -> Vec<FileVariants> {
        let total = paths.len();
        let processed = AtomicUsize::new(0);

        self.emit_progress(ProgressPhase::Preprocessing, 0, total, "Starting batch...");

        let results: Vec<_> = paths
            .par_iter()
            .map(|path| {
                let result = self.preprocess_file(path);

                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                if current % 10 == 0 || current == total {
                    self.emit_progress(
                        ProgressPhase::Preprocessing,
                        current,
                        total,
                        format!("Preprocessed {}/{} files", current, total),
                    );
                }

                (path.clone(), result)
            })
            .collect();

        self.emit_progress(ProgressPhase::Complete, total, total, "Batch complete");
        results
    }

    /// Preprocess every configured source file under a directory
    pub fn preprocess_directory(&self, dir: &Path) -> Vec<FileVariants> {
        self.emit_progress(ProgressPhase::Scanning, 0, 0, "Scanning directory...");

        let paths: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.config.matches_extension(e.path()))
            .filter(|e| !self.config.is_excluded(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        info!("Found {} files to preprocess", paths.len());
        self.emit_progress(
            ProgressPhase::Scanning,
            paths.len(),
            paths.len(),
            format!("Found {} files", paths.len()),
        );

        self.preprocess_files(&paths)
    }

    /// Preprocess a single file
    pub fn preprocess_file(&self, path: &Path) -> Result<BTreeMap<String, String>> {
        debug!("Preprocessing {:?}", path);
        let file = File::open(path)?;
        Preprocessor::new().preprocess(file)
    }

    fn emit_progress<S: Into<String>>(
        &self,
        phase: ProgressPhase,
        current: usize,
        total: usize,
        message: S,
    ) {
        if let Some(ref callback) = self.progress_callback {
            callback(ProgressEvent {
                phase,
                current,
                total,
                message: message.into(),
            });
        }
    }
}

impl Default for ParallelPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
