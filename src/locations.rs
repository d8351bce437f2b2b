//! Input locations
//!
//! The external shell hands over each input either as a file path or as
//! in-memory text.

use std::fmt;
use std::path::{Path, PathBuf};

/// Where an input document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// In-memory document text
    String(String),
}

impl Location {
    /// A location on disk
    pub fn path(path: impl AsRef<Path>) -> Self {
        Location::Path(path.as_ref().to_path_buf())
    }

    /// An in-memory document
    pub fn text(content: impl Into<String>) -> Self {
        Location::String(content.into())
    }

    /// Short name used in messages and notices
    pub fn describe(&self) -> String {
        match self {
            Location::Path(p) => p.display().to_string(),
            Location::String(_) => "<string>".to_string(),
        }
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::Path(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::Path(path.to_path_buf())
    }
}
