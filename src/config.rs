//! Runtime settings. Defaults live under a dot-folder in the user's home; each
//! one can be overridden through a `LIBRARY_*` environment variable.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
const LOG_DIR_NAME: &str = "logs";
const DEFAULT_ADMIN: &str = "admin";
const DEFAULT_LOG_FILTER: &str = "library_manager=info";

pub const ENV_DB_PATH: &str = "LIBRARY_DB_PATH";
pub const ENV_LOG_DIR: &str = "LIBRARY_LOG_DIR";
pub const ENV_ADMIN_USER: &str = "LIBRARY_ADMIN_USER";
pub const ENV_ADMIN_PASSWORD: &str = "LIBRARY_ADMIN_PASSWORD";
pub const ENV_SEED_USERS: &str = "LIBRARY_SEED_USERS";
pub const ENV_LOG_FILTER: &str = "LIBRARY_LOG";

/// The single shared administrator identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    /// Exact, case-sensitive comparison of both fields.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN.to_string(),
            password: DEFAULT_ADMIN.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_filter: String,
    pub admin: AdminCredentials,
    /// `(name, username)` pairs inserted when the users table is empty.
    pub seed_users: Vec<(String, String)>,
}

impl AppConfig {
    /// Resolve settings from the process environment and the user's home.
    pub fn load() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Self::from_lookup(base_dirs.home_dir(), |key| env::var(key).ok())
    }

    /// Resolve settings with `lookup` standing in for the environment.
    pub fn from_lookup<F>(home: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let data_dir = home.join(DATA_DIR_NAME);

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));
        let log_dir = read(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(LOG_DIR_NAME));
        let log_filter = read(ENV_LOG_FILTER).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let defaults = AdminCredentials::default();
        let admin = AdminCredentials {
            username: read(ENV_ADMIN_USER).unwrap_or(defaults.username),
            password: read(ENV_ADMIN_PASSWORD).unwrap_or(defaults.password),
        };

        let seed_users = match read(ENV_SEED_USERS) {
            Some(raw) => parse_seed_users(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            db_path,
            log_dir,
            log_filter,
            admin,
            seed_users,
        })
    }
}

/// Parse `Name:username,Name:username`. Empty entries are skipped; an entry
/// without a colon or with a blank side is rejected.
pub fn parse_seed_users(raw: &str) -> Result<Vec<(String, String)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, username) = entry
                .split_once(':')
                .ok_or_else(|| anyhow!("seed user `{entry}` must look like Name:username"))?;
            let (name, username) = (name.trim(), username.trim());
            if name.is_empty() || username.is_empty() {
                return Err(anyhow!("seed user `{entry}` has a blank name or username"));
            }
            Ok((name.to_string(), username.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(Path::new("/home/librarian"), |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_live_under_home() {
        let config = config_with(&[]).unwrap();

        assert_eq!(
            config.db_path,
            PathBuf::from("/home/librarian/.library-manager/library.sqlite")
        );
        assert_eq!(
            config.log_dir,
            PathBuf::from("/home/librarian/.library-manager/logs")
        );
        assert_eq!(config.admin, AdminCredentials::default());
        assert_eq!(config.log_filter, "library_manager=info");
        assert!(config.seed_users.is_empty());
    }

    #[test]
    fn environment_overrides_win() {
        let config = config_with(&[
            (ENV_DB_PATH, "/tmp/lib.sqlite"),
            (ENV_ADMIN_USER, "root"),
            (ENV_ADMIN_PASSWORD, "hunter2"),
            (ENV_SEED_USERS, "Ada Lovelace:ada, Grace:grace"),
        ])
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/lib.sqlite"));
        assert!(config.admin.verify("root", "hunter2"));
        assert!(!config.admin.verify("admin", "admin"));
        assert_eq!(
            config.seed_users,
            vec![
                ("Ada Lovelace".to_string(), "ada".to_string()),
                ("Grace".to_string(), "grace".to_string()),
            ]
        );
    }

    #[test]
    fn blank_overrides_fall_back_to_defaults() {
        let config = config_with(&[(ENV_ADMIN_PASSWORD, "  ")]).unwrap();
        assert!(config.admin.verify("admin", "admin"));
    }

    #[test]
    fn malformed_seed_users_are_rejected() {
        assert!(parse_seed_users("Ada").is_err());
        assert!(parse_seed_users("Ada:").is_err());
        assert!(parse_seed_users(" , ,").unwrap().is_empty());
    }

    #[test]
    fn credentials_are_case_sensitive() {
        let admin = AdminCredentials::default();
        assert!(admin.verify("admin", "admin"));
        assert!(!admin.verify("Admin", "admin"));
        assert!(!admin.verify("admin", ""));
    }
}
