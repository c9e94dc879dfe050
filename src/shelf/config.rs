use crate::error::{Result, ShelfError};
use crate::store::fs::write_atomic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_SHELF_ROOT: &str = "shelf";

/// Configuration for shelf, stored as `config.json` in the user config directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Shelf root used when neither `--shelf` nor `SHELF_ROOT` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf_root: Option<PathBuf>,
}

impl ShelfConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            ShelfError::StorageFailure(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{}: {}", config_path.display(), e),
            ))
        })
    }

    /// Save config to the given directory, creating it if needed
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let mut content =
            serde_json::to_string_pretty(self).map_err(|e| ShelfError::StorageFailure(e.into()))?;
        content.push('\n');
        write_atomic(config_dir, CONFIG_FILENAME, content.as_bytes())
    }
}

/// Where the shelf root in use was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    Flag,
    Env,
    ConfigFile,
    Default,
}

impl fmt::Display for RootSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RootSource::Flag => "--shelf flag",
            RootSource::Env => "SHELF_ROOT",
            RootSource::ConfigFile => "config file",
            RootSource::Default => "default",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfPaths {
    pub root: PathBuf,
    pub root_source: RootSource,
    /// `None` when the platform has no user config directory.
    pub config_dir: Option<PathBuf>,
}

impl ShelfPaths {
    /// Resolves the shelf root. An explicit root (from the flag or the
    /// environment) wins; otherwise the config file, then `./shelf`.
    pub fn resolve(
        explicit: Option<(PathBuf, RootSource)>,
        config_dir: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some((root, root_source)) = explicit {
            return Ok(Self {
                root,
                root_source,
                config_dir,
            });
        }

        let configured = match &config_dir {
            Some(dir) => ShelfConfig::load(dir)?.shelf_root,
            None => None,
        };

        let (root, root_source) = match configured {
            Some(root) => (root, RootSource::ConfigFile),
            None => (PathBuf::from(DEFAULT_SHELF_ROOT), RootSource::Default),
        };

        Ok(Self {
            root,
            root_source,
            config_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = ShelfConfig::load(dir.path().join("nowhere")).unwrap();
        assert_eq!(config, ShelfConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join("nested").join("config");

        let config = ShelfConfig {
            shelf_root: Some(PathBuf::from("/srv/books")),
        };
        config.save(&config_dir).unwrap();

        let loaded = ShelfConfig::load(&config_dir).unwrap();
        assert_eq!(loaded, config);

        let names: Vec<_> = fs::read_dir(&config_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["config.json"]);
    }

    #[test]
    fn test_garbage_config_is_storage_failure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), "{ nope").unwrap();

        let err = ShelfConfig::load(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"shelf_root": "/a", "theme": "dark"}"#,
        )
        .unwrap();
        let config = ShelfConfig::load(dir.path()).unwrap();
        assert_eq!(config.shelf_root, Some(PathBuf::from("/a")));
    }

    #[test]
    fn test_explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        ShelfConfig {
            shelf_root: Some(PathBuf::from("/from/config")),
        }
        .save(dir.path())
        .unwrap();

        let paths = ShelfPaths::resolve(
            Some((PathBuf::from("/from/env"), RootSource::Env)),
            Some(dir.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(paths.root, PathBuf::from("/from/env"));
        assert_eq!(paths.root_source, RootSource::Env);
    }

    #[test]
    fn test_config_file_before_default() {
        let dir = TempDir::new().unwrap();
        ShelfConfig {
            shelf_root: Some(PathBuf::from("/from/config")),
        }
        .save(dir.path())
        .unwrap();

        let paths = ShelfPaths::resolve(None, Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(paths.root, PathBuf::from("/from/config"));
        assert_eq!(paths.root_source, RootSource::ConfigFile);
    }

    #[test]
    fn test_default_root() {
        let dir = TempDir::new().unwrap();
        let paths = ShelfPaths::resolve(None, Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(paths.root, PathBuf::from("shelf"));
        assert_eq!(paths.root_source, RootSource::Default);

        let paths = ShelfPaths::resolve(None, None).unwrap();
        assert_eq!(paths.root_source, RootSource::Default);
    }
}
