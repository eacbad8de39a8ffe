//! Config path resolution

use std::path::{Path, PathBuf};

/// File name of the runner config
pub const CONFIG_FILE_NAME: &str = "retrorunner.toml";

/// Environment variable overriding the config location
const CONFIG_ENV: &str = "RETRORUNNER_CONFIG";

/// Returns the config path for a save directory.
///
/// `$RETRORUNNER_CONFIG` wins when set; otherwise
/// `{save_dir}/retrorunner.toml`.
pub fn config_path(save_dir: &Path) -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => save_dir.join(CONFIG_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_format() {
        if std::env::var_os(CONFIG_ENV).is_some() {
            return;
        }
        let path = config_path(Path::new("/data/saves"));
        assert!(path.ends_with("saves/retrorunner.toml"));
    }
}
