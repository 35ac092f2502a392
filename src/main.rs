// Headless run: streams a simulated training run into an in-memory report
// and prints the finished report as plain text.
//
//   cargo run --release -- [config.json]
//
// For the live browser view run the studio instead:
//   cargo run --bin studio --release
use std::process::ExitCode;

use ferrite_report::{render_plain, run_report, RecordingSurface, RunConfig, RunControl};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match RunConfig::load_json(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("cannot load config '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => RunConfig::default(),
    };

    match run_report(RecordingSurface::new(), &config, RunControl::default()) {
        Ok((surface, history)) => {
            println!("{}", render_plain(&surface));
            log::info!("{} epoch(s) streamed, {} report ops", history.len(), surface.ops().len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
