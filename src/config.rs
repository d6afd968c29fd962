use std::path::PathBuf;

const DEFAULT_DB_NAME: &str = "coach.db";
const APP_DIR: &str = "study-coach";

pub const DB_ENV: &str = "COACH_DB";
pub const CATALOG_ENV: &str = "COACH_CATALOG";

pub fn db_path() -> PathBuf {
    if let Ok(path) = std::env::var(DB_ENV) {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);

    if let Err(e) = std::fs::create_dir_all(&config_dir) {
        log::warn!("Could not create {}: {}", config_dir.display(), e);
    }
    config_dir.join(DEFAULT_DB_NAME)
}

/// Catalog file to load, if any. `None` means the built-in catalog.
pub fn catalog_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var(CATALOG_ENV).ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Both env vars are exercised in one test so parallel tests never race.
    #[test]
    fn paths_follow_env_vars() {
        let test_path = "/tmp/test_coach.db";
        env::set_var(DB_ENV, test_path);
        assert_eq!(db_path().to_str().unwrap(), test_path);
        env::remove_var(DB_ENV);

        let path = db_path();
        let path_str = path.to_str().unwrap();
        assert!(path_str.ends_with("coach.db"));
        assert!(path_str.contains("study-coach"));

        env::set_var(CATALOG_ENV, "/tmp/from_env.json");
        assert_eq!(
            catalog_path(Some(PathBuf::from("/tmp/flag.json"))),
            Some(PathBuf::from("/tmp/flag.json"))
        );
        assert_eq!(catalog_path(None), Some(PathBuf::from("/tmp/from_env.json")));
        env::remove_var(CATALOG_ENV);

        assert_eq!(catalog_path(None), None);
    }
}
