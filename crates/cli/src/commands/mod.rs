pub mod chat;
pub mod doctor;
pub mod index;
pub mod init;
pub mod serve;

use buddy_config::AppConfig;
use std::path::{Path, PathBuf};

/// Where the config file lives: the `--config` path or the default location.
pub fn config_path(override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}
