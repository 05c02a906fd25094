//! Development server with live reload via Server-Sent Events.
//!
//! Serves the generated site from disk with [`ServeDir`], injects the reload
//! client into HTML pages and streams [`DevEvent`](crate::dev::DevEvent)s to
//! connected pages. Directories without an `index.html` fall back to their
//! `default.aspx`.

use crate::dev::{DevEvent, ServerConfig, SharedState};
use crate::error::{CliError, Result};
use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode, Uri},
    middleware::{self, Next},
    response::{sse::Event, sse::KeepAlive, IntoResponse, Response, Sse},
    routing::{get, MethodRouter},
    Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Event stream endpoint.
pub const SSE_PATH: &str = "/__pressline_sse__";

/// Reload client endpoint.
pub const RELOAD_SCRIPT_PATH: &str = "/__pressline_reload__.js";

const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");

/// Tried after `index.html` for directory requests.
const DEFAULT_DOCUMENT: &str = "default.aspx";

/// Development server.
pub struct DevServer {
    config: ServerConfig,
    state: SharedState,
}

impl DevServer {
    pub fn new(config: ServerConfig, state: SharedState) -> Self {
        Self { config, state }
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// Returns once the socket is bound, so a bind failure is reported to the
    /// caller rather than from inside the task.
    ///
    /// # Errors
    ///
    /// Returns error if server cannot bind to configured address
    pub async fn listen(self) -> Result<JoinHandle<Result<()>>> {
        let addr = self.config.addr;
        let server_url = self.config.server_url();

        let app = build_router(self.state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        crate::ui::success(&format!("Development server running at {}", server_url));

        Ok(tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .map_err(|e| CliError::Server(format!("Server error: {}", e)))
        }))
    }
}

/// Build the axum router with all routes.
pub fn build_router(state: SharedState) -> Router {
    let site = Router::new()
        .fallback_service(site_files(&state))
        .layer(middleware::from_fn(inject_into_pages));

    Router::new()
        .route(SSE_PATH, get(handle_sse))
        .route(RELOAD_SCRIPT_PATH, get(handle_reload_script))
        .fallback_service(site)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Static files of the generated site. `index.html` is served for
/// directories; when it is missing the request falls through to
/// [`serve_default_document`].
fn site_files(state: &SharedState) -> ServeDir<MethodRouter> {
    ServeDir::new(state.site_dir())
        .append_index_html_on_directories(true)
        .fallback(get(serve_default_document).with_state(Arc::clone(state)))
}

/// Handle SSE connections for reload events.
async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();

    tracing::debug!("Client {} connected", id);

    state.broadcast(&DevEvent::ClientConnected { id });

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Serve the reload client script.
async fn handle_reload_script() -> Response {
    respond(
        StatusCode::OK,
        "application/javascript",
        Body::from(RELOAD_SCRIPT),
    )
}

/// Serve a directory's `default.aspx`, the SharePoint default document.
async fn serve_default_document(State(state): State<SharedState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    if !path.ends_with('/') {
        return not_found(&path);
    }

    let Ok(uri) = format!("{path}{DEFAULT_DOCUMENT}").parse::<Uri>() else {
        return not_found(&path);
    };
    let (mut parts, body) = request.into_parts();
    parts.uri = uri;

    match ServeDir::new(state.site_dir())
        .try_call(Request::from_parts(parts, body))
        .await
    {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&path),
        Ok(response) => response.map(Body::new),
        Err(err) => {
            crate::ui::warning(&format!("Failed to serve {path}: {err}"));
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "text/plain",
                Body::from(format!("Failed to read {path}")),
            )
        }
    }
}

/// Add the reload client to every page served from the site and disable
/// caching for all site responses.
async fn inject_into_pages(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if response.status() != StatusCode::OK || !is_page(&path, &response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let content = match body::to_bytes(body, usize::MAX).await {
        Ok(content) => content,
        Err(err) => {
            crate::ui::warning(&format!("Failed to read {path}: {err}"));
            return respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "text/plain",
                Body::from(format!("Failed to read {path}")),
            );
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    Response::from_parts(parts, Body::from(inject_reload_script(&content)))
}

/// HTML documents, including `.aspx` pages and directory requests (which
/// resolve to `index.html` or `default.aspx`).
fn is_page(path: &str, response: &Response) -> bool {
    let html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"));

    html || path.ends_with('/') || path.ends_with(".aspx")
}

fn not_found(path: &str) -> Response {
    respond(
        StatusCode::NOT_FOUND,
        "text/plain",
        Body::from(format!("File not found: {path}")),
    )
}

fn respond(status: StatusCode, content_type: &str, body: Body) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Inject reload script into HTML content.
///
/// Adds the reload client script before the closing </body> tag.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(content);
    let script_tag = format!(r#"<script src="{}"></script>"#, RELOAD_SCRIPT_PATH);

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script_tag.len() + 10);
        result.push_str(&html[..pos]);
        result.push_str("\n  ");
        result.push_str(&script_tag);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result.into_bytes();
    }

    let mut result = html.into_owned();
    result.push('\n');
    result.push_str(&script_tag);
    result.into_bytes()
}
