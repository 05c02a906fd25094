//! Dev server over a real socket.

use pressline_cli::dev::server::build_router;
use pressline_cli::dev::{DevEvent, DevServerState};
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn start(site: &std::path::Path) -> (SocketAddr, Arc<DevServerState>) {
    let state = Arc::new(DevServerState::new(site.to_path_buf()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(Arc::clone(&state));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state)
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

#[tokio::test]
async fn test_html_gets_reload_client() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("index.html"),
        "<html><body><h1>Home</h1></body></html>",
    )
    .unwrap();
    let (addr, _state) = start(temp.path()).await;

    let response = get(addr, "/").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("<h1>Home</h1>"));
    assert!(response.contains(r#"<script src="/__pressline_reload__.js"></script>"#));
}

#[tokio::test]
async fn test_sharepoint_default_document() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("team")).unwrap();
    fs::write(temp.path().join("team/default.aspx"), "<body>team</body>").unwrap();
    let (addr, _state) = start(temp.path()).await;

    let response = get(addr, "/team/").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("text/html"));
    assert!(response.contains("__pressline_reload__.js"));
}

#[tokio::test]
async fn test_index_html_wins_over_default_document() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("team")).unwrap();
    fs::write(temp.path().join("team/index.html"), "<body>index</body>").unwrap();
    fs::write(temp.path().join("team/default.aspx"), "<body>aspx</body>").unwrap();
    let (addr, _state) = start(temp.path()).await;

    let response = get(addr, "/team/").await;

    assert!(response.contains("index"));
    assert!(!response.contains("aspx</body>"));
}

#[tokio::test]
async fn test_aspx_pages_are_html() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("default.aspx"), "<body>home</body>").unwrap();
    let (addr, _state) = start(temp.path()).await;

    let response = get(addr, "/default.aspx").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("text/html; charset=utf-8"));
    assert!(response.contains("__pressline_reload__.js"));
}

#[tokio::test]
async fn test_encoded_paths_are_decoded() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("my page")).unwrap();
    fs::write(temp.path().join("my page/index.html"), "<body>spaced</body>").unwrap();
    let (addr, _state) = start(temp.path()).await;

    let response = get(addr, "/my%20page/").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("spaced"));
}

#[tokio::test]
async fn test_requests_cannot_leave_the_site() {
    let temp = TempDir::new().unwrap();
    let site = temp.path().join("_site");
    fs::create_dir_all(&site).unwrap();
    fs::write(temp.path().join("secret.txt"), "top secret").unwrap();
    let (addr, _state) = start(&site).await;

    for path in ["/../secret.txt", "/%2e%2e/secret.txt", "/a/..%2f..%2fsecret.txt"] {
        let response = get(addr, path).await;
        assert!(!response.starts_with("HTTP/1.1 200"), "{path} was served");
        assert!(!response.contains("top secret"));
    }
}

#[tokio::test]
async fn test_assets_are_served_untouched() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("css")).unwrap();
    fs::write(temp.path().join("css/main.css"), "body{margin:0}").unwrap();
    let (addr, _state) = start(temp.path()).await;

    let response = get(addr, "/css/main.css").await;

    assert!(response.contains("text/css"));
    assert!(response.ends_with("body{margin:0}"));
}

#[tokio::test]
async fn test_reload_client_and_missing_files() {
    let temp = TempDir::new().unwrap();
    let (addr, _state) = start(temp.path()).await;

    let script = get(addr, "/__pressline_reload__.js").await;
    assert!(script.starts_with("HTTP/1.1 200"));
    assert!(script.contains("EventSource"));

    let missing = get(addr, "/nope.html").await;
    assert!(missing.starts_with("HTTP/1.1 404"));
}

#[tokio::test]
async fn test_broadcast_reaches_registered_clients() {
    let temp = TempDir::new().unwrap();
    let state = DevServerState::new(temp.path().to_path_buf());
    let (_a, mut first) = state.register_client();
    let (b, mut second) = state.register_client();
    state.unregister_client(b);

    state.broadcast(&DevEvent::Reload);

    assert_eq!(first.recv().await.unwrap(), r#"{"type":"reload"}"#);
    assert!(second.recv().await.is_none());
    assert_eq!(state.client_count(), 1);
}
