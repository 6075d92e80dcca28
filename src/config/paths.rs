use std::path::PathBuf;

use tracing::{debug, warn};

/// Get the path to the config.json file.
/// Looks for config.json in the app root (parent of the directory holding the binary).
pub(super) fn get_config_path() -> PathBuf {
    // Executable is at: app_root/bin/ssm-dashboard
    // Config should be at: app_root/config.json
    if let Ok(exe_path) = std::env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");

        if let Some(app_root) = exe_path.parent().and_then(|bin_dir| bin_dir.parent()) {
            let config_path = app_root.join("config.json");
            if config_path.exists() {
                debug!(path = %config_path.display(), "Using app root config");
                return config_path;
            }
        }
    }

    warn!("Using fallback: looking for config.json in current directory");
    PathBuf::from("config.json")
}
