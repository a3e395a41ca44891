//! Directory layout below a data root

use crate::error::{IngestError, IngestResult};
use crate::models::FileKind;
use std::path::{Path, PathBuf};

/// Well-known subdirectories of a data root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub const MDAT_DIR: &'static str = "mdat";
    pub const JSON_DIR: &'static str = "json";
    pub const TXT_DIR: &'static str = "txt";
    pub const STEPPED_SINE_DIR: &'static str = "stepped-sine";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Vendor container bundles
    pub fn mdat_dir(&self) -> PathBuf {
        self.root.join(Self::MDAT_DIR)
    }

    /// Exported-result documents (scanned recursively)
    pub fn json_dir(&self) -> PathBuf {
        self.root.join(Self::JSON_DIR)
    }

    pub fn txt_dir(&self) -> PathBuf {
        self.root.join(Self::TXT_DIR)
    }

    /// Stepped-sine distortion exports
    pub fn stepped_sine_dir(&self) -> PathBuf {
        self.root.join(Self::STEPPED_SINE_DIR)
    }

    /// Directory holding files of `kind`
    pub fn dir_for(&self, kind: FileKind) -> PathBuf {
        match kind {
            FileKind::Mdat => self.mdat_dir(),
            FileKind::Json => self.json_dir(),
        }
    }

    /// Create the root and every subdirectory; existing ones are left alone
    pub fn ensure_dirs(&self) -> IngestResult<()> {
        for dir in [
            self.mdat_dir(),
            self.json_dir(),
            self.txt_dir(),
            self.stepped_sine_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| IngestError::unreadable(&dir, e))?;
        }
        tracing::debug!(root = %self.root.display(), "Data directories ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dirs_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));

        layout.ensure_dirs().unwrap();
        layout.ensure_dirs().unwrap();

        assert!(layout.mdat_dir().is_dir());
        assert!(layout.json_dir().is_dir());
        assert!(layout.txt_dir().is_dir());
        assert!(layout.stepped_sine_dir().is_dir());
    }

    #[test]
    fn test_dir_for_kind_matches_scanner_directory() {
        let layout = DataLayout::new("/data");
        for kind in [FileKind::Mdat, FileKind::Json] {
            assert_eq!(layout.dir_for(kind), Path::new("/data").join(kind.directory()));
        }
    }
}
