use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::ItemUpdate;
use crate::store::ShelfStore;

pub fn run(store: &mut ShelfStore, id: &str, update: &ItemUpdate) -> Result<CmdResult> {
    let item = store.update(id, update)?;

    let mut result = CmdResult::default();
    if update.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Nothing to change for {}, timestamp refreshed.",
            item.id
        )));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Item updated ({}): {}",
            item.id, item.title
        )));
    }
    Ok(result.with_affected_items(vec![item]))
}
