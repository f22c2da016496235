//! Command implementations.

pub mod config;
pub mod serve;

use std::path::{Path, PathBuf};

/// Resolve the config file path: the `--config` flag (with `~` expanded)
/// or the platform default.
pub fn config_path(flag: Option<&Path>) -> PathBuf {
    match flag {
        Some(path) => {
            let path_str = path.to_string_lossy();
            PathBuf::from(shellexpand::tilde(&path_str).into_owned())
        }
        None => hydroscope_core::Config::default_path(),
    }
}
