use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::ShelfStore;

pub fn run(store: &ShelfStore, id: &str) -> Result<CmdResult> {
    let (item, text) = store.get(id)?;
    Ok(CmdResult::default()
        .with_listed_items(vec![item])
        .with_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::add;
    use crate::commands::fixtures::store_with_source;
    use crate::error::ErrorKind;

    #[test]
    fn returns_metadata_and_text() {
        let (_dir, mut store, source) = store_with_source("line 1\nline 2\n");
        add::run(&mut store, "a", &source, "A", None).unwrap();

        let res = run(&store, "a").unwrap();
        assert_eq!(res.listed_items[0].title, "A");
        assert_eq!(res.text.as_deref(), Some("line 1\nline 2\n"));
    }

    #[test]
    fn missing_item() {
        let (_dir, store, _) = store_with_source("");
        let err = run(&store, "ghost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
