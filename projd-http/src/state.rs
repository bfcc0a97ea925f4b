use std::sync::Arc;

use projd_core::{ArchiveOptions, Policy, ProjectRoot};

use crate::config::ServerConfig;

/// Immutable per-process settings shared by every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    root: ProjectRoot,
    policy: Policy,
    archive: ArchiveOptions,
    public_prefix: String,
    stream_buffer: usize,
}

impl AppState {
    pub fn new(
        root: ProjectRoot,
        policy: Policy,
        archive: ArchiveOptions,
        public_prefix: String,
        stream_buffer: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                root,
                policy,
                archive,
                public_prefix,
                stream_buffer: stream_buffer.max(1024),
            }),
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> projd_core::Result<Self> {
        Ok(Self::new(
            ProjectRoot::open(&cfg.project_root)?,
            Policy {
                allow_symlinks: cfg.allow_symlinks,
            },
            ArchiveOptions {
                chunk_size: cfg.chunk_size,
            },
            cfg.normalized_prefix()
                .map_err(projd_core::ProjdError::InvalidInput)?,
            cfg.stream_buffer,
        ))
    }

    pub fn root(&self) -> &ProjectRoot {
        &self.inner.root
    }

    pub fn policy(&self) -> &Policy {
        &self.inner.policy
    }

    pub fn archive(&self) -> &ArchiveOptions {
        &self.inner.archive
    }

    /// Mount point of the raw project files, e.g. `/projects`.
    pub fn public_prefix(&self) -> &str {
        &self.inner.public_prefix
    }

    pub fn stream_buffer(&self) -> usize {
        self.inner.stream_buffer
    }
}
