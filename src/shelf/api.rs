//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for shelf operations, whatever the UI.
//!
//! Each method forwards to exactly one `commands::<name>::run` function, which in
//! turn makes one [`ShelfStore`] call. The facade:
//! - **Dispatches** to the command function
//! - **Normalizes inputs** (borrowed paths, optional memo, partial updates)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It never writes to stdout or stderr and never formats output; error kinds
//! pass through unchanged.
//!
//! ## Testing Strategy
//!
//! API tests check dispatch and return shapes. Command logic is tested in the
//! command modules and storage behavior in `store/`.

use crate::commands;
use crate::config::ShelfPaths;
use crate::error::Result;
use crate::model::ItemUpdate;
use crate::store::ShelfStore;
use std::path::Path;

/// The main API facade for shelf operations.
pub struct ShelfApi {
    store: ShelfStore,
    paths: ShelfPaths,
}

impl ShelfApi {
    pub fn new(store: ShelfStore, paths: ShelfPaths) -> Self {
        Self { store, paths }
    }

    pub fn add_item(
        &mut self,
        id: &str,
        source: &Path,
        title: &str,
        memo: Option<&str>,
    ) -> Result<commands::CmdResult> {
        commands::add::run(&mut self.store, id, source, title, memo)
    }

    pub fn show_item(&self, id: &str) -> Result<commands::CmdResult> {
        commands::show::run(&self.store, id)
    }

    pub fn item_info(&self, id: &str) -> Result<commands::CmdResult> {
        commands::info::run(&self.store, id)
    }

    pub fn edit_item(
        &mut self,
        id: &str,
        title: Option<String>,
        memo: Option<String>,
    ) -> Result<commands::CmdResult> {
        commands::edit::run(&mut self.store, id, &ItemUpdate::new(title, memo))
    }

    pub fn delete_item(&mut self, id: &str) -> Result<commands::CmdResult> {
        commands::delete::run(&mut self.store, id)
    }

    pub fn list_items(&self) -> Result<commands::CmdResult> {
        commands::list::run(&self.store)
    }

    pub fn item_path(&self, id: &str) -> Result<commands::CmdResult> {
        commands::paths::run(&self.store, id)
    }

    pub fn doctor(&mut self) -> Result<commands::CmdResult> {
        commands::doctor::run(&mut self.store)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn paths(&self) -> &ShelfPaths {
        &self.paths
    }
}

pub use crate::commands::config::ConfigAction;
pub use commands::{CmdMessage, CmdResult, MessageLevel};
