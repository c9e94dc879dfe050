use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::ShelfStore;

pub fn run(store: &ShelfStore, id: &str) -> Result<CmdResult> {
    let item = store.info(id)?;
    Ok(CmdResult::default().with_listed_items(vec![item]))
}
