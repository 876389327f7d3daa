use std::path::PathBuf;

/// Environment variable that overrides the database location.
pub const DB_ENV_VAR: &str = "SRAMIKA_DB";

const DB_FILE_NAME: &str = "sramika.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the store location: explicit path, then `SRAMIKA_DB`, then the
    /// platform data directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let env = std::env::var_os(DB_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let db_path = explicit.or(env).unwrap_or_else(Self::default_path);
        Self { db_path }
    }

    fn default_path() -> PathBuf {
        // XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "sramika") {
            proj_dirs.data_dir().join(DB_FILE_NAME)
        } else {
            PathBuf::from(DB_FILE_NAME)
        }
    }
}
