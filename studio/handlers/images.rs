use std::io::Cursor;
use tiny_http::Response;

use log::warn;

use crate::state::{lock_state, SharedState};
use crate::util::image::encode_png;

/// `GET /report/images/{id}.png`
///
/// Serves one example tile of the current report as a PNG.
pub fn handle_png(id: u64, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let tile = lock_state(&state).images.get(&id).cloned();
    match tile {
        Some(tile) => match encode_png(&tile) {
            Ok(bytes) => crate::routes::png_response(bytes),
            Err(e) => {
                warn!("could not encode tile {}: {}", id, e);
                crate::routes::server_error("could not encode image")
            }
        },
        None => crate::routes::not_found(),
    }
}
