use std::io;

use axum::body::{Body, Bytes};
use futures::{StreamExt, future, stream};
use projd_core::{ArchiveOptions, FileEntry, ResolvedFolder, build_archive};
use tokio_util::io::{ReaderStream, SyncIoBridge};
use tracing::{error, info};

/// Response body that streams the folder's archive as it is built.
///
/// The builder runs on a blocking thread and writes into a bounded pipe; the body
/// drains the other end, so a slow client stalls disk reads instead of
/// buffering. If the build fails, the body ends with an error rather than a
/// clean EOF and hyper aborts the connection: the client never sees a
/// truncated archive as a finished transfer. A client that disconnects drops
/// the read half, which fails the builder's next write.
pub fn archive_body(
    folder: ResolvedFolder,
    entries: Vec<FileEntry>,
    opts: ArchiveOptions,
    buffer: usize,
) -> Body {
    let (tx, rx) = tokio::io::duplex(buffer);
    // must be created on the runtime; it blocks on it from the builder thread
    let sink = SyncIoBridge::new(tx);

    let job = tokio::task::spawn_blocking(move || {
        let res = build_archive(&folder, &entries, sink, &opts);
        match &res {
            Ok(summary) => info!(
                folder = folder.id(),
                members = summary.members,
                bytes_in = summary.bytes_in,
                "archive streamed"
            ),
            Err(e) => error!(folder = folder.id(), error = %e, "archive stream aborted"),
        }
        res
    });

    let outcome = stream::once(async move {
        let item: Option<io::Result<Bytes>> = match job.await {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(Err(io::Error::other(e))),
            Err(e) => Some(Err(io::Error::other(e))),
        };
        item
    })
    .filter_map(future::ready);

    Body::from_stream(ReaderStream::with_capacity(rx, buffer).chain(outcome))
}
