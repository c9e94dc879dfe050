use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::ShelfStore;
use std::path::Path;

pub fn run(
    store: &mut ShelfStore,
    id: &str,
    source: &Path,
    title: &str,
    memo: Option<&str>,
) -> Result<CmdResult> {
    let item = store.add(id, source, title, memo)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Item added ({}, {}): {}",
        item.id, item.format, item.title
    )));
    Ok(result.with_affected_items(vec![item]))
}
