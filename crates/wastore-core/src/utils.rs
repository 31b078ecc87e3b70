//! Path helpers.

use std::path::PathBuf;

/// Get the wastore data directory (e.g. `~/.wastore/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".wastore")
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_path_ends_with_dir() {
        assert!(get_data_path().ends_with(".wastore"));
    }

    #[test]
    fn test_expand_home_tilde() {
        let result = expand_home("~/sessions");
        assert!(result.ends_with("sessions"));
        assert!(!result.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_expand_home_bare() {
        assert!(!expand_home("~").to_string_lossy().contains('~'));
    }

    #[test]
    fn test_expand_home_plain() {
        assert_eq!(expand_home("/var/lib/x"), PathBuf::from("/var/lib/x"));
        assert_eq!(expand_home("."), PathBuf::from("."));
    }
}
