use serde::{Serialize, Deserialize};

use ferrite_report::{Result, RunConfig};

/// Settings of the studio server.
///
/// Loaded from the JSON file named by the first command-line argument, if
/// any. Missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Address the HTTP server binds to.
    pub addr: String,
    /// Run started by `POST /train/start`.
    pub run:  RunConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            addr: "127.0.0.1:7878".to_owned(),
            // A short per-batch delay keeps the browser animation visible.
            run:  RunConfig { batch_delay_ms: 2, ..RunConfig::default() },
        }
    }
}

impl StudioConfig {
    pub fn load_json(path: &str) -> Result<StudioConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
