/// State file persistence: the engine's snapshot, on disk.
use std::io;
use std::path::Path;

use elorank_core::{EngineError, RatingEngine};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// Import `path` into `engine` if the file exists. Returns whether it did.
pub fn load_state(engine: &mut RatingEngine, path: &Path) -> Result<bool, StoreError> {
    let blob = match std::fs::read_to_string(path) {
        Ok(blob) => blob,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    engine.import_snapshot(&blob)?;
    info!(path = %path.display(), comparisons = engine.total_comparisons(), "loaded state file");
    Ok(true)
}

/// Export `engine` to `path`, replacing it only once the new contents are fully written.
pub fn save_state(engine: &RatingEngine, path: &Path) -> Result<(), StoreError> {
    let blob = engine.export_snapshot()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    if let Err(e) = std::fs::write(&tmp, blob).and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
