// projd_core/src/domain.rs
use std::path::{Path, PathBuf};

use crate::archive::ARCHIVE_EXTENSION;

/// A folder id that passed validation and containment, bound to its
/// canonical on-disk location. Lives for one request.
#[derive(Clone, Debug)]
pub struct ResolvedFolder {
    pub(crate) id: String,
    pub(crate) path: PathBuf,
    pub(crate) root: PathBuf,
}

impl ResolvedFolder {
    /// The validated id, `/`-separated.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Canonical absolute path of the folder.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical project root the folder is contained in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Attachment file name for the folder's archive, e.g. `demo.zip`.
    /// Separators and quotes are replaced so the name stays one header token.
    pub fn archive_file_name(&self) -> String {
        let stem: String = self
            .id
            .chars()
            .map(|c| match c {
                '/' | '\\' | '"' => '_',
                c => c,
            })
            .collect();
        format!("{stem}.{ARCHIVE_EXTENSION}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Single path segment, never starting with `.`.
    pub name: String,
    /// `<folder id>/<name>`, relative to the project root.
    pub relative_path: String,
    pub size_bytes: u64,
    pub is_directory: bool,
}

impl FileEntry {
    pub fn is_file(&self) -> bool {
        !self.is_directory
    }
}
