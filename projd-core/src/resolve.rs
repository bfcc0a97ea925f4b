use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::domain::ResolvedFolder;
use crate::error::{ProjdError, Result};
use crate::policy::Policy;

pub const MAX_FOLDER_ID_LEN: usize = 1024;

/// The directory all project folders live under. Canonicalized once, then
/// shared read-only between requests.
#[derive(Clone, Debug)]
pub struct ProjectRoot {
    root: PathBuf,
}

impl ProjectRoot {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = fs::canonicalize(path)?;
        if !fs::metadata(&root)?.is_dir() {
            return Err(std::io::Error::new(
                ErrorKind::NotADirectory,
                format!("project root is not a directory: {}", path.display()),
            )
            .into());
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Map an untrusted folder id to a contained, existing directory.
    pub fn resolve(&self, folder_id: &str) -> Result<ResolvedFolder> {
        let rel = validate_folder_id(folder_id)?;
        let canonical = self.contained(&rel, folder_id)?;

        if !fs::metadata(&canonical)?.is_dir() {
            return Err(ProjdError::NotFound(folder_id.to_string()));
        }

        Ok(ResolvedFolder {
            id: rel.to_string_lossy().replace('\\', "/"),
            path: canonical,
            root: self.root.clone(),
        })
    }

    /// Map an untrusted `/`-separated file path to a contained regular file.
    ///
    /// The same segment rules as folder ids apply, so hidden files and
    /// anything under a hidden directory are unreachable. Unless the policy
    /// allows symlinks, a path that crosses one is treated as missing.
    pub fn resolve_file(&self, file_path: &str, policy: &Policy) -> Result<PathBuf> {
        let rel = validate_folder_id(file_path)?;
        let canonical = self.contained(&rel, file_path)?;

        if !policy.allow_symlinks && canonical != self.root.join(&rel) {
            debug!(file = file_path, resolved = %canonical.display(), "path crosses a symlink");
            return Err(ProjdError::NotFound(file_path.to_string()));
        }
        if !fs::metadata(&canonical)?.is_file() {
            return Err(ProjdError::NotFound(file_path.to_string()));
        }
        Ok(canonical)
    }

    fn contained(&self, rel: &Path, id: &str) -> Result<PathBuf> {
        let canonical = match fs::canonicalize(self.root.join(rel)) {
            Ok(p) => p,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Err(ProjdError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        // symlinks inside the root may still point outside of it
        if !canonical.starts_with(&self.root) {
            debug!(id, resolved = %canonical.display(), "path escapes project root");
            return Err(ProjdError::InvalidInput(format!(
                "{id} resolves outside the project root"
            )));
        }
        Ok(canonical)
    }
}

/// Pure string validation of a folder id; never touches the filesystem.
///
/// Accepts one or more `/`-separated segments. Rejects absolute paths, drive
/// prefixes, `.`/`..` segments, hidden segments, empty segments and control
/// characters.
pub fn validate_folder_id(folder_id: &str) -> Result<PathBuf> {
    let invalid = |reason: &str| ProjdError::InvalidInput(format!("{folder_id:?}: {reason}"));

    if folder_id.is_empty() {
        return Err(invalid("empty folder id"));
    }
    if folder_id.len() > MAX_FOLDER_ID_LEN {
        return Err(invalid("folder id too long"));
    }
    if folder_id.chars().any(char::is_control) {
        return Err(invalid("control characters are not allowed"));
    }
    if folder_id.starts_with('/') || folder_id.starts_with('\\') {
        return Err(invalid("absolute paths are not allowed"));
    }
    let bytes = folder_id.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Err(invalid("drive prefixes are not allowed"));
    }

    let mut rel = PathBuf::new();
    for seg in folder_id.split(['/', '\\']) {
        if seg.is_empty() {
            return Err(invalid("empty path segment"));
        }
        if seg == ".." {
            return Err(invalid("parent directory segments are not allowed"));
        }
        if seg.starts_with('.') {
            return Err(invalid("hidden path segments are not allowed"));
        }
        rel.push(seg);
    }

    // On Windows `push` can still pick up a prefix; every component must be plain.
    if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(invalid("unsupported path component"));
    }

    Ok(rel)
}
