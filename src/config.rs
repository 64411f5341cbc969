use std::path::{Path, PathBuf};

pub const TASKS_FILE: &str = "tasks.json";
pub const PROGRESS_FILE: &str = "user_progress.json";
pub const PROBLEMS_FILE: &str = "problems.json";
pub const PROBLEMS_SOURCE_FILE: &str = "problems.js";
pub const LOG_FILE: &str = "tracker.log";

/// How the catalog file should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    /// Strict JSON array (`problems.json`).
    Json,
    /// Relaxed array literal (`problems.js` and friends).
    Relaxed,
}

impl CatalogFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => CatalogFormat::Json,
            _ => CatalogFormat::Relaxed,
        }
    }
}

/// File locations, all resolved against the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub tasks_path: PathBuf,
    pub progress_path: PathBuf,
    pub catalog_path: PathBuf,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>, catalog: Option<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let catalog_path = match catalog {
            Some(path) if path.is_absolute() => path,
            Some(path) => data_dir.join(path),
            None => default_catalog_path(&data_dir),
        };

        Self {
            tasks_path: data_dir.join(TASKS_FILE),
            progress_path: data_dir.join(PROGRESS_FILE),
            catalog_path,
            data_dir,
        }
    }

    pub fn catalog_format(&self) -> CatalogFormat {
        CatalogFormat::for_path(&self.catalog_path)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

// problems.json wins; a lone problems.js is used when the JSON file is absent.
fn default_catalog_path(data_dir: &Path) -> PathBuf {
    let json = data_dir.join(PROBLEMS_FILE);
    let source = data_dir.join(PROBLEMS_SOURCE_FILE);
    if !json.exists() && source.exists() {
        source
    } else {
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_are_relative_to_data_dir() {
        let config = Config::new("/data", None);
        assert_eq!(config.tasks_path, PathBuf::from("/data/tasks.json"));
        assert_eq!(
            config.progress_path,
            PathBuf::from("/data/user_progress.json")
        );
        assert_eq!(config.catalog_path, PathBuf::from("/data/problems.json"));
    }

    #[test]
    fn default_data_dir_is_current_dir() {
        let config = Config::new(".", None);
        assert_eq!(config.tasks_path, PathBuf::from("./tasks.json"));
    }

    #[test]
    fn explicit_relative_catalog_joins_data_dir() {
        let config = Config::new("/data", Some(PathBuf::from("catalog/450.js")));
        assert_eq!(config.catalog_path, PathBuf::from("/data/catalog/450.js"));
        assert_eq!(config.catalog_format(), CatalogFormat::Relaxed);
    }

    #[test]
    fn explicit_absolute_catalog_is_kept() {
        let config = Config::new("/data", Some(PathBuf::from("/srv/problems.json")));
        assert_eq!(config.catalog_path, PathBuf::from("/srv/problems.json"));
        assert_eq!(config.catalog_format(), CatalogFormat::Json);
    }

    #[test]
    fn falls_back_to_js_source_when_json_missing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROBLEMS_SOURCE_FILE), "[]").unwrap();

        let config = Config::new(dir.path(), None);
        assert_eq!(config.catalog_path, dir.path().join(PROBLEMS_SOURCE_FILE));
        assert_eq!(config.catalog_format(), CatalogFormat::Relaxed);
    }

    #[test]
    fn prefers_json_when_both_exist() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROBLEMS_SOURCE_FILE), "[]").unwrap();
        std::fs::write(dir.path().join(PROBLEMS_FILE), "[]").unwrap();

        let config = Config::new(dir.path(), None);
        assert_eq!(config.catalog_path, dir.path().join(PROBLEMS_FILE));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            CatalogFormat::for_path(Path::new("a/PROBLEMS.JSON")),
            CatalogFormat::Json
        );
        assert_eq!(
            CatalogFormat::for_path(Path::new("problems.ts")),
            CatalogFormat::Relaxed
        );
        assert_eq!(
            CatalogFormat::for_path(Path::new("problems")),
            CatalogFormat::Relaxed
        );
    }
}
