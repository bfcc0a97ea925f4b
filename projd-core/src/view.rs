use serde::{Deserialize, Serialize};

use crate::domain::FileEntry;

/// One listing row as clients see it, shared by the HTTP API and the CLI's
/// JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub name: String,
    /// URL of the raw file under the public prefix.
    pub path: String,
    pub size: u64,
    pub is_directory: bool,
}

impl FileView {
    /// `public_prefix` may carry a trailing slash; the path never doubles it.
    pub fn new(entry: &FileEntry, public_prefix: &str) -> Self {
        Self {
            name: entry.name.clone(),
            path: format!(
                "{}/{}",
                public_prefix.trim_end_matches('/'),
                entry.relative_path
            ),
            size: entry.size_bytes,
            is_directory: entry.is_directory,
        }
    }
}
