use std::fs::File;
use std::io::{Read, Write};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::domain::{FileEntry, ResolvedFolder};
use crate::error::{ProjdError, Result};
use crate::spool::MemberSpool;
use crate::stats::ArchiveSummary;

pub const ARCHIVE_EXTENSION: &str = "zip";
pub const ARCHIVE_MEDIA_TYPE: &str = "application/zip";

/// Deflate level for every member: the strongest flate2 offers.
pub const DEFLATE_LEVEL: i64 = 9;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
const MIN_CHUNK_SIZE: usize = 1024;

#[derive(Clone, Debug)]
pub struct ArchiveOptions {
    /// Bytes read from disk per step; each chunk is handed to the compressor
    /// before the next read.
    pub chunk_size: usize,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ArchiveOptions {
    fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(MIN_CHUNK_SIZE)
    }
}

/// State for streaming one folder into one zip.
///
/// Only regular files become members; directories are dropped on
/// construction. Members are deflated at [`DEFLATE_LEVEL`] and carry the
/// fixed 1980-01-01 DOS timestamp, so an unchanged folder always yields the
/// same bytes.
pub struct ArchiveJob<'a> {
    folder: &'a ResolvedFolder,
    files: Vec<&'a FileEntry>,
    opts: ArchiveOptions,
    started: bool,
    finished: bool,
}

impl<'a> ArchiveJob<'a> {
    pub fn new(folder: &'a ResolvedFolder, entries: &'a [FileEntry], opts: &ArchiveOptions) -> Self {
        Self {
            folder,
            files: entries.iter().filter(|e| e.is_file()).collect(),
            opts: opts.clone(),
            started: false,
            finished: false,
        }
    }

    /// Member names, in the order they will be written.
    pub fn members(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.iter().map(|e| e.name.as_str())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stream every selected file into `sink` and finalize the archive.
    ///
    /// A member reaches the sink once its local header has been patched with
    /// the final CRC and sizes, which happens when the next member starts.
    /// On error the central directory is never written: whatever reached the
    /// sink is not a readable archive and must be treated as a failed transfer.
    pub fn write_to<W: Write>(&mut self, sink: W) -> Result<ArchiveSummary> {
        self.started = true;
        let (spool, halt) = MemberSpool::new(sink).map_err(archive_err)?;
        let mut zip = ZipWriter::new(spool);
        // zip flushes right after patching a header; the spool forwards on flush
        zip.set_flush_on_finish_file(true);

        let summary = match self.write_members(&mut zip) {
            Ok(summary) => summary,
            Err(e) => {
                // dropping the writer finalizes into the spool; keep that off the sink
                halt.halt();
                return Err(e);
            }
        };

        let mut spool = zip.finish()?;
        spool.flush().map_err(archive_err)?;

        self.finished = true;
        Ok(summary)
    }

    fn write_members<W: Write>(
        &self,
        zip: &mut ZipWriter<MemberSpool<W>>,
    ) -> Result<ArchiveSummary> {
        let mut buf = vec![0u8; self.opts.effective_chunk_size()];
        let mut summary = ArchiveSummary::default();

        for entry in &self.files {
            let path = self.folder.path().join(&entry.name);

            // open before the local header goes out, so a vanished file
            // leaves no member behind
            let mut src = File::open(&path)?;
            let md = src.metadata()?;

            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(DEFLATE_LEVEL))
                .last_modified_time(DateTime::default())
                .unix_permissions(mode_from(&md))
                .large_file(md.len() >= u64::from(u32::MAX));

            zip.start_file(entry.name.as_str(), options)?;
            let n = copy_chunked(&mut src, zip, &mut buf)?;

            summary.members += 1;
            summary.bytes_in += n;
            debug!(folder = self.folder.id(), member = %entry.name, bytes = n, "archived member");
        }

        Ok(summary)
    }
}

impl Drop for ArchiveJob<'_> {
    fn drop(&mut self) {
        if self.started && !self.finished {
            warn!(folder = self.folder.id(), "archive abandoned before finalization");
        }
    }
}

/// Build the archive for `entries` of `folder` into `sink`.
///
/// Blocking: callers on an async runtime run this on a blocking thread.
pub fn build_archive<W: Write>(
    folder: &ResolvedFolder,
    entries: &[FileEntry],
    sink: W,
    opts: &ArchiveOptions,
) -> Result<ArchiveSummary> {
    ArchiveJob::new(folder, entries, opts).write_to(sink)
}

/// Read errors surface as `Io`, write errors as `Archive`.
fn copy_chunked<R: Read, W: Write>(src: &mut R, dst: &mut W, buf: &mut [u8]) -> Result<u64> {
    let mut total = 0u64;
    loop {
        let n = src.read(buf)?;
        if n == 0 {
            break;
        }
        dst.write_all(&buf[..n]).map_err(archive_err)?;
        total += n as u64;
    }
    Ok(total)
}

fn archive_err(e: std::io::Error) -> ProjdError {
    ProjdError::Archive(e.to_string())
}

fn mode_from(_md: &std::fs::Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        _md.permissions().mode() & 0o7777
    }
    #[cfg(not(unix))]
    {
        0o644
    }
}
