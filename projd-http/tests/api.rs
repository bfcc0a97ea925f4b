use std::fs;
use std::io::{Cursor, Read};

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use projd_core::{ArchiveOptions, FileEntry, FileView, Policy, ProjectRoot};
use projd_http::stream::archive_body;
use projd_http::{AppState, router};
use tempfile::TempDir;
use tower::ServiceExt;

struct Fixture {
    _root: TempDir,
    _static: TempDir,
    app: Router,
    root: ProjectRoot,
}

fn fixture() -> Fixture {
    let root_dir = TempDir::new().unwrap();
    let demo = root_dir.path().join("demo");
    fs::create_dir_all(demo.join(".git")).unwrap();
    fs::create_dir_all(demo.join("sub")).unwrap();
    fs::write(demo.join("a.txt"), b"abc").unwrap();
    fs::write(demo.join("b.txt"), b"").unwrap();
    fs::write(demo.join(".env"), b"SECRET=1").unwrap();
    fs::write(demo.join(".git").join("config"), b"[remote]").unwrap();
    fs::create_dir_all(root_dir.path().join("empty")).unwrap();

    let static_dir = TempDir::new().unwrap();
    fs::write(static_dir.path().join("index.html"), "<h1>projects</h1>").unwrap();
    fs::write(static_dir.path().join(".env"), "UI_SECRET=1").unwrap();

    let root = ProjectRoot::open(root_dir.path()).unwrap();
    let state = AppState::new(
        root.clone(),
        Policy::default(),
        ArchiveOptions::default(),
        "/projects".to_string(),
        16 * 1024,
    );
    let app = router(state, static_dir.path());

    Fixture {
        _root: root_dir,
        _static: static_dir,
        app,
        root,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, http::HeaderMap, Vec<u8>) {
    let res = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn error_message(body: &[u8]) -> String {
    let v: serde_json::Value = serde_json::from_slice(body).unwrap();
    v["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn lists_folder_without_hidden_entries() {
    let fx = fixture();
    let (status, _, body) = get(&fx.app, "/api/files?folder=demo").await;
    assert_eq!(status, StatusCode::OK);

    let rows: Vec<FileView> = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        rows,
        vec![
            FileView {
                name: "a.txt".into(),
                path: "/projects/demo/a.txt".into(),
                size: 3,
                is_directory: false,
            },
            FileView {
                name: "b.txt".into(),
                path: "/projects/demo/b.txt".into(),
                size: 0,
                is_directory: false,
            },
            FileView {
                name: "sub".into(),
                path: "/projects/demo/sub".into(),
                size: rows[2].size,
                is_directory: true,
            },
        ]
    );
}

#[tokio::test]
async fn listing_errors_map_to_client_statuses() {
    let fx = fixture();

    let (status, _, body) = get(&fx.app, "/api/files?folder=..%2F..%2Fetc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("invalid folder"));

    let (status, _, _) = get(&fx.app, "/api/files?folder=%2Fetc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get(&fx.app, "/api/files").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = get(&fx.app, "/api/files?folder=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "folder not found: missing");
}

#[tokio::test]
async fn downloads_folder_as_zip_attachment() {
    let fx = fixture();
    let (status, headers, body) = get(&fx.app, "/api/download-project?folder=demo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"demo.zip\""
    );

    let mut ar = zip::ZipArchive::new(Cursor::new(body)).unwrap();
    assert_eq!(ar.len(), 2);
    let mut a = ar.by_name("a.txt").unwrap();
    let mut content = Vec::new();
    a.read_to_end(&mut content).unwrap();
    assert_eq!(content, b"abc");
    drop(a);
    assert_eq!(ar.by_name("b.txt").unwrap().size(), 0);
    assert!(ar.by_name("sub").is_err());
}

#[tokio::test]
async fn empty_folder_downloads_empty_archive() {
    let fx = fixture();
    let (status, _, body) = get(&fx.app, "/api/download-project?folder=empty").await;
    assert_eq!(status, StatusCode::OK);
    let ar = zip::ZipArchive::new(Cursor::new(body)).unwrap();
    assert_eq!(ar.len(), 0);
}

#[tokio::test]
async fn download_errors_before_streaming_are_json() {
    let fx = fixture();

    let (status, headers, body) = get(&fx.app, "/api/download-project?folder=..").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert!(!error_message(&body).is_empty());

    let (status, _, _) = get(&fx.app, "/api/download-project?folder=nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failure_after_streaming_starts_errors_the_body() {
    let fx = fixture();
    let folder = fx.root.resolve("demo").unwrap();
    let entries = vec![
        FileEntry {
            name: "a.txt".into(),
            relative_path: "demo/a.txt".into(),
            size_bytes: 3,
            is_directory: false,
        },
        FileEntry {
            name: "ghost.txt".into(),
            relative_path: "demo/ghost.txt".into(),
            size_bytes: 10,
            is_directory: false,
        },
    ];

    let body = archive_body(folder, entries, ArchiveOptions::default(), 1024);
    assert!(to_bytes(body, usize::MAX).await.is_err());
}

#[tokio::test]
async fn serves_raw_files_and_static_ui() {
    let fx = fixture();

    let (status, _, body) = get(&fx.app, "/projects/demo/a.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"abc");

    let (status, _, body) = get(&fx.app, "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>projects</h1>");
}

#[tokio::test]
async fn raw_files_hide_dotfiles_and_hidden_dirs() {
    let fx = fixture();

    for uri in [
        "/projects/demo/.env",
        "/projects/demo/.git/config",
        "/projects/demo/%2Eenv",
        "/projects/demo/sub",
        "/projects/demo/../demo/a.txt",
    ] {
        let (status, _, body) = get(&fx.app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(!String::from_utf8_lossy(&body).contains("SECRET"), "{uri}");
    }
}

#[cfg(unix)]
#[tokio::test]
async fn raw_files_do_not_follow_symlinks_out_of_root() {
    let fx = fixture();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("passwd"), b"root:x:0:0").unwrap();
    let demo = fx.root.path().join("demo");
    std::os::unix::fs::symlink(outside.path().join("passwd"), demo.join("passwd")).unwrap();
    std::os::unix::fs::symlink(outside.path(), demo.join("elsewhere")).unwrap();

    for uri in ["/projects/demo/passwd", "/projects/demo/elsewhere/passwd"] {
        let (status, _, body) = get(&fx.app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(!String::from_utf8_lossy(&body).contains("root:x"), "{uri}");
    }
}

#[tokio::test]
async fn static_ui_hides_dotfiles() {
    let fx = fixture();
    for uri in ["/.env", "/%2eenv"] {
        let (status, _, body) = get(&fx.app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(!String::from_utf8_lossy(&body).contains("UI_SECRET"), "{uri}");
    }
}
