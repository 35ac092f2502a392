use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn bytes_response(status: u16, content_type: &str, bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        header("Content-Type", content_type).into_iter().collect(),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn png_response(bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, "image/png", bytes)
}

pub fn redirect(location: &str) -> Response<Cursor<Vec<u8>>> {
    Response::new(
        StatusCode(303),
        header("Location", location).into_iter().collect(),
        Cursor::new(Vec::new()),
        Some(0),
        None,
    )
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    bytes_response(404, "text/plain", b"404 Not Found".to_vec())
}

pub fn server_error(message: &str) -> Response<Cursor<Vec<u8>>> {
    bytes_response(500, "text/plain", message.as_bytes().to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Extracts `{id}` from `/report/images/{id}.png`.
fn image_id(path: &str) -> Option<u64> {
    path.strip_prefix("/report/images/")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Dispatches incoming requests to the appropriate handler.
///
/// The SSE handler takes ownership of the request to stream for as long as
/// the run lasts; every other handler returns a response sent from here.
pub fn dispatch(request: Request, state: SharedState) {
    let method = request.method().clone();
    let path = match request.url().find('?') {
        Some(pos) => request.url()[..pos].to_owned(),
        None      => request.url().to_owned(),
    };

    // SSE is long-lived: the handler takes ownership and drives the stream loop.
    if method == Method::Get && path == "/report/events" {
        handlers::report_sse::handle(request, state);
        return;
    }

    let response = match (method, path.as_str()) {
        (Method::Get,  "/")            => handlers::train::handle_get(state),
        (Method::Post, "/train/start") => handlers::train::handle_start(state),
        (Method::Post, "/train/stop")  => handlers::train::handle_stop(state),

        // ── Example tiles ────────────────────────────────────────────────
        (Method::Get, p) => match image_id(p) {
            Some(id) => handlers::images::handle_png(id, state),
            None     => not_found(),
        },

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(),
    };

    let _ = request.respond(response);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_paths_parse() {
        assert_eq!(image_id("/report/images/42.png"), Some(42));
        assert_eq!(image_id("/report/images/x.png"), None);
        assert_eq!(image_id("/report/images/42.jpg"), None);
        assert_eq!(image_id("/elsewhere/42.png"), None);
    }
}
