use crate::utils::error::{CncError, Result};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "CNC_CONFIG";

const APP_DIR: &str = "cnc";
const CONFIG_FILE_NAMES: [&str; 4] = ["config.yaml", "config.yml", "config.toml", "config.json"];

/// `$XDG_CONFIG_HOME/cnc`, then `$HOME/.config/cnc`.
pub fn default_config_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        dirs.push(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        let dir = PathBuf::from(home).join(".config").join(APP_DIR);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

pub fn candidate_paths(dirs: &[PathBuf]) -> Vec<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .collect()
}

/// An explicit path must exist; otherwise the first existing candidate in
/// `dirs` wins.
pub fn resolve_config_path_in(explicit: Option<&Path>, dirs: &[PathBuf]) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(CncError::ConfigNotFound {
                searched: vec![path.to_path_buf()],
            })
        };
    }

    let candidates = candidate_paths(dirs);
    match candidates.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(CncError::ConfigNotFound {
            searched: candidates,
        }),
    }
}

pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_config_path_in(explicit, &default_config_dirs())
}
