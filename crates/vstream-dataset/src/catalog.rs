//! Corpus enumeration.
//!
//! A corpus root holds one directory per class, `nonviolent/` and
//! `violent/`, each containing video files directly. The catalog lists
//! them once and hands out shared snapshots, so the train and validation
//! streams of a class always walk the same sequence of files.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use vstream_models::{ClassCounts, ClassLabel, VideoFile};

use crate::config::ListingOrder;
use crate::error::{DatasetError, DatasetResult};

/// Snapshot of the files of both classes under a corpus root.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    root: PathBuf,
    nonviolent: Arc<[VideoFile]>,
    violent: Arc<[VideoFile]>,
}

impl DatasetCatalog {
    /// Enumerate both classes, files sorted by name.
    pub fn enumerate(root: impl AsRef<Path>) -> DatasetResult<Self> {
        Self::enumerate_with(root, ListingOrder::default())
    }

    /// Enumerate both classes with an explicit file order.
    ///
    /// A missing root or class directory yields an empty class. File paths
    /// are absolute, resolved against the current directory.
    pub fn enumerate_with(root: impl AsRef<Path>, order: ListingOrder) -> DatasetResult<Self> {
        let root = root.as_ref();
        let root = std::path::absolute(root).map_err(|e| DatasetError::io(root, e))?;
        let root = root.as_path();
        let nonviolent = list_class(root, ClassLabel::Nonviolent, order)?;
        let violent = list_class(root, ClassLabel::Violent, order)?;

        info!(
            root = %root.display(),
            nonviolent = nonviolent.len(),
            violent = violent.len(),
            order = %order,
            "Catalogued corpus"
        );

        Ok(Self {
            root: root.to_path_buf(),
            nonviolent: nonviolent.into(),
            violent: violent.into(),
        })
    }

    /// Count files per class without keeping the listings.
    pub fn count(root: impl AsRef<Path>) -> DatasetResult<ClassCounts> {
        let root = root.as_ref();
        Ok(ClassCounts::new(
            count_class(root, ClassLabel::Nonviolent)?,
            count_class(root, ClassLabel::Violent)?,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shared file list for one class.
    pub fn files(&self, label: ClassLabel) -> Arc<[VideoFile]> {
        match label {
            ClassLabel::Nonviolent => Arc::clone(&self.nonviolent),
            ClassLabel::Violent => Arc::clone(&self.violent),
        }
    }

    pub fn counts(&self) -> ClassCounts {
        ClassCounts::new(self.nonviolent.len(), self.violent.len())
    }

    pub fn is_empty(&self) -> bool {
        self.counts().is_empty()
    }

    /// Every file, nonviolent first.
    pub fn iter(&self) -> impl Iterator<Item = &VideoFile> {
        self.nonviolent.iter().chain(self.violent.iter())
    }
}

fn class_dir(root: &Path, label: ClassLabel) -> PathBuf {
    root.join(label.dir_name())
}

/// Regular files directly inside `dir`, following symlinks.
/// `None` when `dir` does not exist or is not a directory.
fn regular_files(dir: &Path) -> DatasetResult<Option<Vec<PathBuf>>> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            debug!(path = %dir.display(), "Class path is not a directory");
            return Ok(None);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DatasetError::io(dir, e)),
    }
    let entries = fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DatasetError::io(dir, e))?;
        let path = entry.path();
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => {}
            // Dangling symlink
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Skipping dangling entry");
            }
            Err(e) => return Err(DatasetError::io(path, e)),
        }
    }
    Ok(Some(files))
}

fn list_class(root: &Path, label: ClassLabel, order: ListingOrder) -> DatasetResult<Vec<VideoFile>> {
    let dir = class_dir(root, label);
    let Some(mut paths) = regular_files(&dir)? else {
        debug!(dir = %dir.display(), class = %label, "Class directory missing");
        return Ok(Vec::new());
    };

    if order == ListingOrder::FileName {
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }

    Ok(paths.into_iter().map(|p| VideoFile::new(p, label)).collect())
}

fn count_class(root: &Path, label: ClassLabel) -> DatasetResult<usize> {
    Ok(regular_files(&class_dir(root, label))?.map_or(0, |files| files.len()))
}
