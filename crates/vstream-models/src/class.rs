//! Class labels and catalogued video files.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Binary class of a video in the corpus.
///
/// The integer index is the training target: 0 for nonviolent, 1 for violent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ClassLabel {
    Nonviolent,
    Violent,
}

impl ClassLabel {
    /// Both classes in stream order.
    pub const ALL: [ClassLabel; 2] = [ClassLabel::Nonviolent, ClassLabel::Violent];

    /// Integer target used in label tensors.
    pub fn index(&self) -> i32 {
        match self {
            ClassLabel::Nonviolent => 0,
            ClassLabel::Violent => 1,
        }
    }

    /// Look up a class from its integer target.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(ClassLabel::Nonviolent),
            1 => Some(ClassLabel::Violent),
            _ => None,
        }
    }

    /// Name of the corpus subdirectory holding this class.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ClassLabel::Nonviolent => "nonviolent",
            ClassLabel::Violent => "violent",
        }
    }

    /// Human-readable name for reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            ClassLabel::Nonviolent => "Nonviolent",
            ClassLabel::Violent => "Violent",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// A video file discovered in the corpus.
///
/// Immutable once enumerated; identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct VideoFile {
    /// Path to the video file
    pub path: PathBuf,
    /// Class the file was catalogued under
    pub label: ClassLabel,
}

impl VideoFile {
    pub fn new(path: impl Into<PathBuf>, label: ClassLabel) -> Self {
        Self {
            path: path.into(),
            label,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component, lossily converted for logging.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_indices() {
        assert_eq!(ClassLabel::Nonviolent.index(), 0);
        assert_eq!(ClassLabel::Violent.index(), 1);
        assert_eq!(ClassLabel::from_index(1), Some(ClassLabel::Violent));
        assert_eq!(ClassLabel::from_index(2), None);
    }

    #[test]
    fn test_label_serde_names() {
        let json = serde_json::to_string(&ClassLabel::Nonviolent).unwrap();
        assert_eq!(json, "\"nonviolent\"");
        let label: ClassLabel = serde_json::from_str("\"violent\"").unwrap();
        assert_eq!(label, ClassLabel::Violent);
    }

    #[test]
    fn test_video_file_name() {
        let file = VideoFile::new("/data/violent/fight_01.mp4", ClassLabel::Violent);
        assert_eq!(file.file_name(), "fight_01.mp4");
        assert_eq!(file.label.dir_name(), "violent");
    }
}
