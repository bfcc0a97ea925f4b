use std::path::Path as FsPath;

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::{HeaderValue, StatusCode, header};
use projd_core::{ARCHIVE_MEDIA_TYPE, FileEntry, FileView, ProjdError, ResolvedFolder, list_entries};
use serde::Deserialize;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use crate::stream::archive_body;

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    pub folder: Option<String>,
}

pub fn router(state: AppState, static_dir: impl AsRef<FsPath>) -> Router {
    let raw_files = format!("{}/{{*path}}", state.public_prefix());
    let ui = ServeDir::new(static_dir);

    Router::new()
        .route("/api/files", get(list_files))
        .route("/api/download-project", get(download_project))
        .route(&raw_files, get(raw_file))
        .fallback(move |req: Request| static_file(ui.clone(), req))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_files(
    State(state): State<AppState>,
    Query(q): Query<FolderQuery>,
) -> Result<Json<Vec<FileView>>, ApiError> {
    let (_, entries) = resolve_and_list(&state, q.folder).await?;
    let prefix = state.public_prefix();
    Ok(Json(entries.iter().map(|e| FileView::new(e, prefix)).collect()))
}

async fn download_project(
    State(state): State<AppState>,
    Query(q): Query<FolderQuery>,
) -> Result<Response, ApiError> {
    let (folder, entries) = resolve_and_list(&state, q.folder).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        folder.archive_file_name()
    ))
    .map_err(|_| ProjdError::InvalidInput(format!("{}: unusable archive name", folder.id())))?;

    info!(
        folder = folder.id(),
        files = entries.iter().filter(|e| e.is_file()).count(),
        "starting archive download"
    );

    // past this point the response is committed; failures abort the stream
    let body = archive_body(
        folder,
        entries,
        state.archive().clone(),
        state.stream_buffer(),
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(ARCHIVE_MEDIA_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Resolution and enumeration use blocking std I/O; keep them off the runtime.
async fn resolve_and_list(
    state: &AppState,
    folder: Option<String>,
) -> Result<(ResolvedFolder, Vec<FileEntry>), ApiError> {
    let folder_id =
        folder.ok_or_else(|| ProjdError::InvalidInput("missing folder parameter".to_string()))?;

    let st = state.clone();
    let listed = tokio::task::spawn_blocking(move || -> projd_core::Result<_> {
        let folder = st.root().resolve(&folder_id)?;
        let entries = list_entries(&folder, st.policy())?;
        Ok((folder, entries))
    })
    .await
    .map_err(|e| ProjdError::Io(std::io::Error::other(e)))?;

    Ok(listed?)
}

/// Raw file under the public prefix. Goes through the same containment and
/// hidden-segment rules as folder ids; anything refused looks missing.
async fn raw_file(
    State(state): State<AppState>,
    Path(rel): Path<String>,
    req: Request,
) -> Result<Response, ApiError> {
    let st = state.clone();
    let lookup = rel.clone();
    let file = tokio::task::spawn_blocking(move || st.root().resolve_file(&lookup, st.policy()))
        .await
        .map_err(|e| ProjdError::Io(std::io::Error::other(e)))?
        .map_err(|e| match e {
            ProjdError::InvalidInput(reason) => {
                debug!(path = %rel, %reason, "refusing raw file");
                ProjdError::NotFound(rel.clone())
            }
            e => e,
        })?;

    let res = ServeFile::new(file)
        .try_call(req)
        .await
        .map_err(ProjdError::Io)?;
    Ok(res.map(Body::new))
}

/// The UI bundle, minus dotfiles.
async fn static_file(mut ui: ServeDir, req: Request) -> Response {
    if has_hidden_segment(req.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    match ui.try_call(req).await {
        Ok(res) => res.map(Body::new),
        Err(e) => ApiError(ProjdError::Io(e)).into_response(),
    }
}

fn has_hidden_segment(path: &str) -> bool {
    path.split('/').any(|seg| {
        seg.starts_with('.') || seg.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("%2e"))
    })
}
