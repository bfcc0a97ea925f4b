use std::fs;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::{FileEntry, ResolvedFolder};
use crate::error::Result;
use crate::policy::Policy;

/// List the immediate, non-hidden children of `folder`.
///
/// Entries come back in byte-wise file name order. A stat failure on any
/// entry fails the whole listing.
pub fn list_entries(folder: &ResolvedFolder, policy: &Policy) -> Result<Vec<FileEntry>> {
    let mut out = Vec::new();

    for e in WalkDir::new(folder.path())
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let e = e.map_err(std::io::Error::from)?;

        let Some(name) = e.file_name().to_str() else {
            warn!(folder = folder.id(), entry = ?e.file_name(), "skipping non UTF-8 entry name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let md = if e.file_type().is_symlink() {
            if !policy.allow_symlinks {
                debug!(folder = folder.id(), entry = name, "skipping symlink");
                continue;
            }
            let target = fs::canonicalize(e.path())?;
            if !target.starts_with(folder.root()) {
                warn!(folder = folder.id(), entry = name, "symlink points outside the project root");
                continue;
            }
            fs::metadata(&target)?
        } else {
            e.metadata().map_err(std::io::Error::from)?
        };

        // sockets, fifos, devices
        if !md.is_file() && !md.is_dir() {
            continue;
        }

        out.push(FileEntry {
            name: name.to_string(),
            relative_path: format!("{}/{}", folder.id(), name),
            size_bytes: md.len(),
            is_directory: md.is_dir(),
        });
    }

    debug!(folder = folder.id(), entries = out.len(), "listed folder");
    Ok(out)
}
