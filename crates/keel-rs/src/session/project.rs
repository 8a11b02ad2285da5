//! Project root discovery and project-type detection from marker files.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Files whose presence marks a directory as a project root.
pub const ROOT_MARKERS: &[&str] = &[
    ".git",
    "go.mod",
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "requirements.txt",
];

/// Ecosystem of the project under the root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Go,
    Nodejs,
    Python,
    Rust,
    Unknown,
}

/// Detection order. The first marker present wins.
const DETECTION_ORDER: &[(&str, ProjectType)] = &[
    ("go.mod", ProjectType::Go),
    ("package.json", ProjectType::Nodejs),
    ("requirements.txt", ProjectType::Python),
    ("pyproject.toml", ProjectType::Python),
    ("setup.py", ProjectType::Python),
    ("Cargo.toml", ProjectType::Rust),
];

impl ProjectType {
    /// Classify `root` by the build manifests it contains.
    pub fn detect(root: &Path) -> Self {
        DETECTION_ORDER
            .iter()
            .find(|(marker, _)| root.join(marker).exists())
            .map_or(ProjectType::Unknown, |(_, kind)| *kind)
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectType::Go => "go",
            ProjectType::Nodejs => "nodejs",
            ProjectType::Python => "python",
            ProjectType::Rust => "rust",
            ProjectType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Walk up from `start` to the nearest directory holding a
/// [`ROOT_MARKERS`] entry. Falls back to `start` when none is found.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| ROOT_MARKERS.iter().any(|m| dir.join(m).exists()))
        .unwrap_or(start)
        .to_path_buf()
}

/// `path` as an absolute path, joined onto `base` when relative.
pub fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
