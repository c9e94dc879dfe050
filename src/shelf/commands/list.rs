use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::ShelfStore;

pub fn run(store: &ShelfStore) -> Result<CmdResult> {
    let items = store.list()?.collect();
    Ok(CmdResult::default().with_listed_items(items))
}
