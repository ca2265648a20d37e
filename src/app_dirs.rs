use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory holding the key-value records and logs
    pub fn data_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("tarix-wpm"),
            )
        } else {
            ProjectDirs::from("uz", "tarix", "tarix-wpm")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn log_dir(data_dir: &std::path::Path) -> PathBuf {
        data_dir.join("logs")
    }

    pub fn sqlite_path(data_dir: &std::path::Path) -> PathBuf {
        data_dir.join("storage.db")
    }
}
