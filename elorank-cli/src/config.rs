/// Config file loading and creation for the elorank CLI.
///
/// Config lives at ~/.config/elorank/config.toml.
/// All fields are optional; CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ElorankConfig {
    pub default_rating: Option<f64>,
    pub k_factor: Option<f64>,
    pub candidate_pairs: Option<usize>,
    pub seed: Option<u64>,
    pub extensions: Option<Vec<String>>,
    pub state_file: Option<PathBuf>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# elorank configuration
# All values here can be overridden by CLI flags.

# Rating given to images that have never been compared
# default_rating = 1500.0

# Maximum rating change per comparison
# k_factor = 32.0

# Random candidate pairs drawn per selection (least-compared one wins)
# candidate_pairs = 100

# Fixed seed for reproducible pair selection
# seed = 42

# File extensions treated as images (case-insensitive)
# extensions = [\"jpg\", \"jpeg\", \"png\", \"bmp\", \"gif\", \"tiff\", \"webp\"]

# Where ratings and comparison history are saved after every judgment
# state_file = \"/home/me/rankings.json\"
";

/// Returns the default config path: ~/.config/elorank/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("elorank").join("config.toml")
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> ElorankConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            toml::from_str(&content)
                .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ElorankConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Create the default config file at `path`. Errors if it already exists.
pub fn create_default_config(path: &Path) {
    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));
}
