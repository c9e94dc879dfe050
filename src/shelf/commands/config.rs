use crate::commands::{CmdMessage, CmdResult};
use crate::config::{ShelfConfig, ShelfPaths};
use crate::error::{Result, ShelfError};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum ConfigAction {
    Show,
    SetShelfRoot(PathBuf),
    UnsetShelfRoot,
}

pub fn run(paths: &ShelfPaths, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::Show => {
            let config = match &paths.config_dir {
                Some(dir) => ShelfConfig::load(dir)?,
                None => ShelfConfig::default(),
            };
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::info(format!(
                "shelf-root = {} (from {})",
                paths.root.display(),
                paths.root_source
            )));
            Ok(result)
        }
        ConfigAction::SetShelfRoot(root) => {
            let dir = config_dir(paths)?;
            let mut config = ShelfConfig::load(dir)?;
            config.shelf_root = Some(root.clone());
            config.save(dir)?;

            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "shelf-root set to {}",
                root.display()
            )));
            Ok(result)
        }
        ConfigAction::UnsetShelfRoot => {
            let dir = config_dir(paths)?;
            let mut config = ShelfConfig::load(dir)?;
            let mut result = CmdResult::default();
            if config.shelf_root.take().is_some() {
                config.save(dir)?;
                result.add_message(CmdMessage::success("shelf-root unset"));
            } else {
                result.add_message(CmdMessage::info("shelf-root was not set"));
            }
            Ok(result.with_config(config))
        }
    }
}

fn config_dir(paths: &ShelfPaths) -> Result<&Path> {
    paths.config_dir.as_deref().ok_or_else(|| {
        ShelfError::StorageFailure(io::Error::new(
            io::ErrorKind::NotFound,
            "no user config directory available",
        ))
    })
}
