#![forbid(unsafe_code)]

pub mod archive;
pub mod domain;
pub mod error;
pub mod list;
pub mod policy;
pub mod resolve;
mod spool;
pub mod stats;
pub mod view;

// Re-exports: stable API surface
pub use archive::{
    ARCHIVE_EXTENSION, ARCHIVE_MEDIA_TYPE, ArchiveJob, ArchiveOptions, DEFLATE_LEVEL, build_archive,
};
pub use domain::{FileEntry, ResolvedFolder};
pub use error::{ProjdError, Result};
pub use list::list_entries;
pub use policy::Policy;
pub use resolve::{ProjectRoot, validate_folder_id};
pub use stats::ArchiveSummary;
pub use view::FileView;
