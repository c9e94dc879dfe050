use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::ShelfStore;

pub fn run(store: &mut ShelfStore) -> Result<CmdResult> {
    let report = store.doctor()?;
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success(format!(
            "No inconsistencies found ({} item(s) checked).",
            report.healthy
        )));
        return Ok(result.with_doctor(report));
    }

    if report.removed_staging_dirs > 0 || report.removed_temp_files > 0 {
        result.add_message(CmdMessage::warning("Leftovers from interrupted operations removed:"));
        if report.removed_staging_dirs > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - {} staging directory(ies) from unfinished adds.",
                report.removed_staging_dirs
            )));
        }
        if report.removed_temp_files > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - {} temporary metadata file(s) from unfinished edits.",
                report.removed_temp_files
            )));
        }
    }

    if !report.corrupt.is_empty() {
        result.add_message(CmdMessage::error(format!(
            "{} corrupt item(s) need attention:",
            report.corrupt.len()
        )));
        for (id, reason) in &report.corrupt {
            result.add_message(CmdMessage::info(format!("  - {}: {}", id, reason)));
        }
    }

    Ok(result.with_doctor(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::store_with_source;
    use crate::commands::{add, MessageLevel};
    use std::fs;

    #[test]
    fn clean_shelf() {
        let (_dir, mut store, source) = store_with_source("x");
        add::run(&mut store, "a", &source, "A", None).unwrap();

        let res = run(&mut store).unwrap();
        assert_eq!(res.messages.len(), 1);
        assert_eq!(res.messages[0].level, MessageLevel::Success);
        assert_eq!(res.doctor.unwrap().healthy, 1);
    }

    #[test]
    fn reports_leftovers_and_corruption() {
        let (_dir, mut store, source) = store_with_source("x");
        add::run(&mut store, "a", &source, "A", None).unwrap();
        fs::create_dir(store.root().join(".staging-b-1")).unwrap();
        fs::remove_file(store.root().join("a").join("a.txt")).unwrap();

        let res = run(&mut store).unwrap();
        let levels: Vec<_> = res.messages.iter().map(|m| m.level.clone()).collect();
        assert_eq!(
            levels,
            vec![
                MessageLevel::Warning,
                MessageLevel::Info,
                MessageLevel::Error,
                MessageLevel::Info,
            ]
        );
        assert!(res.messages[3].content.contains("a: missing text file"));
        assert!(!store.root().join(".staging-b-1").exists());
    }
}
