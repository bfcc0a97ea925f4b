use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use projd_core::error::Result;
use projd_core::{
    ArchiveOptions, ArchiveSummary, FileEntry, FileView, Policy, ProjectRoot, ResolvedFolder,
    build_archive, list_entries,
};
use tracing::warn;

fn open_folder(
    root: &Path,
    folder: &str,
    allow_symlinks: bool,
) -> Result<(ResolvedFolder, Vec<FileEntry>)> {
    let root = ProjectRoot::open(root)?;
    let folder = root.resolve(folder)?;
    let entries = list_entries(&folder, &Policy { allow_symlinks })?;
    Ok((folder, entries))
}

fn render_listing(entries: &[FileEntry], json: bool, public_prefix: &str) -> Result<String> {
    if json {
        let rows: Vec<_> = entries
            .iter()
            .map(|e| FileView::new(e, public_prefix))
            .collect();
        let mut s = serde_json::to_string_pretty(&rows).map_err(std::io::Error::from)?;
        s.push('\n');
        return Ok(s);
    }

    let mut s = String::new();
    for e in entries {
        let kind = if e.is_directory { "/" } else { "" };
        s.push_str(&format!("{}{}  {} bytes\n", e.name, kind, e.size_bytes));
    }
    Ok(s)
}

fn render_summary(summary: &ArchiveSummary) -> Result<String> {
    let mut s = serde_json::to_string(summary).map_err(std::io::Error::from)?;
    s.push('\n');
    Ok(s)
}

pub fn handle_ls(
    root: PathBuf,
    folder: String,
    json: bool,
    public_prefix: String,
    allow_symlinks: bool,
) -> Result<()> {
    let (_, entries) = open_folder(&root, &folder, allow_symlinks)?;
    let text = render_listing(&entries, json, &public_prefix)?;
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    Ok(())
}

pub fn handle_pack(
    root: PathBuf,
    folder: String,
    out: PathBuf,
    chunk_size: usize,
    allow_symlinks: bool,
) -> Result<()> {
    let summary = pack_to(&root, &folder, &out, chunk_size, allow_symlinks)?;
    // stdout may be the archive itself
    std::io::stderr()
        .lock()
        .write_all(render_summary(&summary)?.as_bytes())?;
    Ok(())
}

fn pack_to(
    root: &Path,
    folder: &str,
    out: &Path,
    chunk_size: usize,
    allow_symlinks: bool,
) -> Result<ArchiveSummary> {
    let (folder, entries) = open_folder(root, folder, allow_symlinks)?;
    write_archive(&folder, &entries, out, &ArchiveOptions { chunk_size })
}

fn write_archive(
    folder: &ResolvedFolder,
    entries: &[FileEntry],
    out: &Path,
    opts: &ArchiveOptions,
) -> Result<ArchiveSummary> {
    if out == Path::new("-") {
        return build_archive(folder, entries, std::io::stdout().lock(), opts);
    }

    let res = File::create(out)
        .map_err(Into::into)
        .and_then(|f| build_archive(folder, entries, f, opts));
    if res.is_err() {
        // a partial zip without its central directory is useless
        if let Err(e) = std::fs::remove_file(out) {
            warn!(error = %e, path = %out.display(), "failed to remove partial archive");
        }
    }
    res
}
