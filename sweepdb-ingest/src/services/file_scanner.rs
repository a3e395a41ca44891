//! Data-root file scanner
//!
//! Enumerates container (`mdat/*.mdat`) and exported-result
//! (`json/**/*.json`) files below a data root. Results are sorted by path so
//! runs, and their logs, are reproducible.
//!
//! Symlinks to files are listed under their link path. Symlinked
//! directories are not descended into.

use crate::models::FileKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// File scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Cannot access a directory entry
    #[error("File access error {0}: {1}")]
    FileAccessError(PathBuf, String),

    /// Path is not below the data root
    #[error("Path {path} is outside data root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Data-root file scanner
pub struct FileScanner {
    ignore_patterns: Vec<String>,
}

impl FileScanner {
    /// Scanner with default ignore patterns (OS metadata and VCS directories)
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
            ],
        }
    }

    /// Fail unless `root` is an existing directory
    pub fn check_root(&self, root: &Path) -> Result<(), ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        Ok(())
    }

    /// All files of `kind` below `data_root`, sorted by path
    ///
    /// A missing kind directory yields no files.
    pub fn scan_kind(&self, data_root: &Path, kind: FileKind) -> Result<Vec<PathBuf>, ScanError> {
        self.check_root(data_root)?;

        let dir = data_root.join(kind.directory());
        if !dir.exists() {
            tracing::debug!(dir = %dir.display(), "No {} directory, nothing to scan", kind.as_str());
            return Ok(Vec::new());
        }

        let max_depth = if kind.recursive() { usize::MAX } else { 1 };
        self.scan(&dir, kind.extension(), max_depth)
    }

    /// Files below `dir` whose extension matches (ASCII case-insensitive)
    pub fn scan(&self, dir: &Path, extension: &str, max_depth: usize) -> Result<Vec<PathBuf>, ScanError> {
        self.check_root(dir)?;

        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .follow_links(false)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                ScanError::FileAccessError(path, e.to_string())
            })?;

            if is_file_or_link_to_file(&entry) && has_extension(entry.path(), extension) {
                files.push(entry.into_path());
            }
        }

        files.sort();

        tracing::debug!(
            dir = %dir.display(),
            extension,
            count = files.len(),
            "Scan complete"
        );

        Ok(files)
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();
        !self.ignore_patterns.iter().any(|p| file_name == p.as_str())
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Dangling links are neither
fn is_file_or_link_to_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// `path` relative to `root`, with `/` separators on every platform
pub fn relative_path(root: &Path, path: &Path) -> Result<String, ScanError> {
    let relative = path.strip_prefix(root).map_err(|_| ScanError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    Ok(parts.join("/"))
}
