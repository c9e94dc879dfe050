use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::ShelfStore;

pub fn run(store: &mut ShelfStore, id: &str) -> Result<CmdResult> {
    let removed = store.remove(id)?;
    let mut result = CmdResult::default();

    match removed {
        Some(item) => {
            result.add_message(CmdMessage::success(format!(
                "Item deleted ({}): {}",
                item.id, item.title
            )));
            result.affected_items.push(item);
        }
        None => {
            result.add_message(CmdMessage::warning(format!(
                "Item deleted ({}), its metadata was unreadable.",
                id
            )));
        }
    }

    Ok(result)
}
