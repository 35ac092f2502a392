/// ferrite-report Studio
///
/// Watches a simulated training run live in the browser. The report is
/// streamed op by op over Server-Sent Events and rebuilt by a small script in
/// the page; no JavaScript frameworks required.
///
/// Run with:
///   cargo run --bin studio --release -- [studio.json]
/// Then open http://127.0.0.1:7878 and press "Start run".

mod config;
mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tiny_http::Server;

use config::StudioConfig;
use state::StudioState;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match StudioConfig::load_json(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("cannot load studio config '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => StudioConfig::default(),
    };

    let server = match Server::http(config.addr.as_str()) {
        Ok(server) => server,
        Err(e) => {
            log::error!("failed to bind HTTP server on {}: {}", config.addr, e);
            return ExitCode::FAILURE;
        }
    };

    println!("╔══════════════════════════════════════════════╗");
    println!("║          ferrite-report Studio               ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Open in your browser:                       ║");
    println!("║  http://{:<37}║", config.addr);
    println!("╚══════════════════════════════════════════════╝");

    let shared_state = Arc::new(Mutex::new(StudioState::new(config)));

    // Each request is dispatched on its own thread so the SSE handler
    // (which blocks for the entire run) does not stall page loads and
    // form submissions.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    ExitCode::SUCCESS
}
