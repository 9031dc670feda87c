use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const CONFIG_FILE_NAME: &str = "config.json";

pub fn log_file_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join("showprune").join("showprune.log"))
}

/// Explicit path first, then `config.json` beside the executable, then the
/// platform config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let candidates = [
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME))),
        dirs::config_dir().map(|dir| dir.join("showprune").join(CONFIG_FILE_NAME)),
    ];
    for candidate in candidates.into_iter().flatten() {
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    bail!("no {CONFIG_FILE_NAME} file found")
}
