use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::ShelfStore;

pub fn run(store: &ShelfStore, id: &str) -> Result<CmdResult> {
    let dir = store.item_dir(id)?;
    Ok(CmdResult::default().with_paths(vec![dir]))
}
