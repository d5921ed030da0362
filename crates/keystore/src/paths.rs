use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to the user's home directory. Any other leading-`~` form (e.g.
/// `~otheruser`) is left untouched since there's no portable way to resolve it without an extra
/// dependency.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        return dirs_home().join(rest);
    }
    if path == "~" {
        return dirs_home();
    }
    PathBuf::from(path)
}

/// Default directory holding `identity.private`, `encryption.private`, `transport.private`.
pub fn default_keystore_dir() -> PathBuf {
    default_config_dir().join("keys")
}

/// Default lokinet config directory, `~/.lokinet` unless overridden.
pub fn default_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LOKINET_HOME") {
        return expand_path(&dir);
    }
    dirs_home().join(".lokinet")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| Path::new("/").to_path_buf())
}
