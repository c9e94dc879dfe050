use super::DoctorReport;
use crate::error::{Result, ShelfError};
use crate::extract;
use crate::model::{Format, Item, ItemUpdate};
use crate::validation::{is_valid_id, validate_id};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const STAGING_PREFIX: &str = ".staging-";
const TEMP_SUFFIX: &str = ".tmp";

pub struct ShelfStore {
    root: PathBuf,
}

impl ShelfStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Adds the document at `source` under `id`.
    ///
    /// Text is extracted before anything is written, so an unreadable document
    /// leaves the shelf untouched.
    pub fn add(
        &mut self,
        id: &str,
        source: &Path,
        title: &str,
        memo: Option<&str>,
    ) -> Result<Item> {
        let dir = self.item_path(id)?;
        if fs::symlink_metadata(&dir).is_ok() {
            return Err(ShelfError::DuplicateId(id.to_string()));
        }

        let bytes = read_source(source)?;
        let format = Format::from_path(source);
        let text = extract::extract(format, &bytes)?;

        let source_filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let item = Item::new(
            id.to_string(),
            title.to_string(),
            memo.map(str::to_string),
            format,
            source_filename,
        );

        fs::create_dir_all(&self.root)?;
        self.in_staging(id, &dir, |staging| {
            if let Some(original) = item.original_filename() {
                write_synced(&staging.join(original), &bytes)?;
            }
            write_synced(&staging.join(item.text_filename()), text.as_bytes())?;
            write_synced(
                &staging.join(item.metadata_filename()),
                to_json(&item)?.as_bytes(),
            )?;
            Ok(())
        })?;

        info!(id, %format, "added item");
        Ok(item)
    }

    /// Metadata and extracted text of an item.
    pub fn get(&self, id: &str) -> Result<(Item, String)> {
        let dir = self.existing_dir(id)?;
        let item = load_item(&dir, id)?;
        let text = read_text(&dir, id)?;
        Ok((item, text))
    }

    /// Metadata of an item, without reading its text.
    pub fn info(&self, id: &str) -> Result<Item> {
        let dir = self.existing_dir(id)?;
        let item = load_item(&dir, id)?;
        ensure_text(&dir, &item)?;
        Ok(item)
    }

    /// Applies the supplied fields and atomically rewrites the metadata file.
    pub fn update(&mut self, id: &str, update: &ItemUpdate) -> Result<Item> {
        let dir = self.existing_dir(id)?;
        let mut item = load_item(&dir, id)?;
        item.apply(update);
        write_atomic(&dir, &item.metadata_filename(), to_json(&item)?.as_bytes())?;

        info!(id, "updated item");
        Ok(item)
    }

    /// Deletes the item directory and everything in it.
    ///
    /// Corrupt items can still be removed; the metadata is returned when it
    /// was readable.
    pub fn remove(&mut self, id: &str) -> Result<Option<Item>> {
        let dir = self.existing_dir(id)?;
        let item = load_item(&dir, id).ok();
        fs::remove_dir_all(&dir)?;

        info!(id, "removed item");
        Ok(item)
    }

    /// All items currently on disk, ordered by id.
    ///
    /// Each call rescans the shelf root. Directories that are not named like an
    /// item, or that fail the corrupt-item check, are skipped with a warning.
    pub fn list(&self) -> Result<Items> {
        let mut ids = Vec::new();
        if self.root.is_dir() {
            for entry in fs::read_dir(&self.root)? {
                let path = entry?.path();
                if !path.is_dir() {
                    continue;
                }
                match item_dir_name(&path) {
                    Some(name) => ids.push(name),
                    None => warn_not_an_item(&path),
                }
            }
        }
        ids.sort();

        Ok(Items {
            root: self.root.clone(),
            ids: ids.into_iter(),
        })
    }

    /// Directory of an existing item.
    pub fn item_dir(&self, id: &str) -> Result<PathBuf> {
        self.existing_dir(id)
    }

    /// Cleans up leftovers of interrupted operations and reports corrupt items.
    pub fn doctor(&mut self) -> Result<DoctorReport> {
        let mut report = DoctorReport::default();
        if !self.root.is_dir() {
            return Ok(report);
        }

        let mut entries: Vec<_> = fs::read_dir(&self.root)?
            .collect::<io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        entries.sort();

        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if name.starts_with(STAGING_PREFIX) && path.is_dir() {
                fs::remove_dir_all(&path)?;
                debug!(path = %path.display(), "removed staging directory");
                report.removed_staging_dirs += 1;
                continue;
            }

            if !path.is_dir() {
                continue;
            }
            if !is_valid_id(name) {
                warn_not_an_item(&path);
                continue;
            }

            report.removed_temp_files += remove_temp_files(&path)?;
            match check_item(&path, name) {
                Ok(_) => report.healthy += 1,
                Err(ShelfError::CorruptItem { id, reason }) => report.corrupt.push((id, reason)),
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    fn item_path(&self, id: &str) -> Result<PathBuf> {
        validate_id(id).map_err(|reason| ShelfError::InvalidId {
            id: id.to_string(),
            reason,
        })?;
        Ok(self.root.join(id))
    }

    fn existing_dir(&self, id: &str) -> Result<PathBuf> {
        let dir = self.item_path(id)?;
        if !dir.is_dir() {
            return Err(ShelfError::NotFound(id.to_string()));
        }
        Ok(dir)
    }

    /// Runs `build` against a fresh hidden directory and renames it to `target`
    /// on success. On any failure the staging directory is removed and the
    /// original error is returned.
    fn in_staging<T>(
        &self,
        id: &str,
        target: &Path,
        build: impl FnOnce(&Path) -> Result<T>,
    ) -> Result<T> {
        let staging = self
            .root
            .join(format!("{}{}-{}", STAGING_PREFIX, id, Uuid::new_v4()));
        fs::create_dir(&staging)?;

        let outcome = build(&staging).and_then(|value| {
            fs::rename(&staging, target)?;
            Ok(value)
        });

        if outcome.is_err() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                warn!(path = %staging.display(), error = %e, "failed to roll back staging directory");
            }
        }
        outcome
    }
}

/// Lazy iterator over the items of a shelf, produced by [`ShelfStore::list`].
pub struct Items {
    root: PathBuf,
    ids: std::vec::IntoIter<String>,
}

impl Iterator for Items {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        for id in self.ids.by_ref() {
            let dir = self.root.join(&id);
            let loaded = load_item(&dir, &id).and_then(|item| {
                ensure_text(&dir, &item)?;
                Ok(item)
            });
            match loaded {
                Ok(item) => return Some(item),
                Err(e) => warn!(id = %id, error = %e, "skipping item"),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.ids.len()))
    }
}

fn read_source(source: &Path) -> Result<Vec<u8>> {
    match fs::metadata(source) {
        Ok(meta) if meta.is_file() => Ok(fs::read(source)?),
        Ok(_) => Err(ShelfError::SourceNotFound(source.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ShelfError::SourceNotFound(source.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

fn to_json(item: &Item) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(item).map_err(|e| ShelfError::StorageFailure(e.into()))?;
    json.push('\n');
    Ok(json)
}

fn load_item(dir: &Path, id: &str) -> Result<Item> {
    let path = dir.join(format!("{}.json", id));
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ShelfError::corrupt(id, "missing metadata file"));
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(ShelfError::corrupt(id, "metadata file is not valid UTF-8"));
        }
        Err(e) => return Err(e.into()),
    };

    let item: Item = serde_json::from_str(&content)
        .map_err(|e| ShelfError::corrupt(id, format!("unreadable metadata: {}", e)))?;
    if item.id != id {
        return Err(ShelfError::corrupt(
            id,
            format!("metadata belongs to '{}'", item.id),
        ));
    }
    Ok(item)
}

fn read_text(dir: &Path, id: &str) -> Result<String> {
    match fs::read_to_string(dir.join(format!("{}.txt", id))) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ShelfError::corrupt(id, "missing text file"))
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            Err(ShelfError::corrupt(id, "text file is not valid UTF-8"))
        }
        Err(e) => Err(e.into()),
    }
}

fn ensure_text(dir: &Path, item: &Item) -> Result<()> {
    if dir.join(item.text_filename()).is_file() {
        Ok(())
    } else {
        Err(ShelfError::corrupt(&item.id, "missing text file"))
    }
}

fn check_item(dir: &Path, id: &str) -> Result<Item> {
    let item = load_item(dir, id)?;
    ensure_text(dir, &item)?;
    if let Some(original) = item.original_filename() {
        if !dir.join(&original).is_file() {
            return Err(ShelfError::corrupt(
                id,
                format!("missing original copy {}", original),
            ));
        }
    }
    Ok(item)
}

/// Name of a directory that may hold an item. Staging directories and
/// names that are not valid ids yield `None`.
fn item_dir_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    is_valid_id(name).then(|| name.to_string())
}

fn warn_not_an_item(path: &Path) {
    let is_staging = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(STAGING_PREFIX));
    if !is_staging {
        warn!(path = %path.display(), "skipping directory that is not a shelf item");
    }
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Writes `contents` next to `name` in `dir` and renames it into place.
pub(crate) fn write_atomic(dir: &Path, name: &str, contents: &[u8]) -> Result<()> {
    let target = dir.join(name);
    let tmp = dir.join(format!(".{}.{}{}", name, Uuid::new_v4(), TEMP_SUFFIX));

    let written = write_synced(&tmp, contents).and_then(|()| fs::rename(&tmp, &target));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn remove_temp_files(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_temp = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.') && n.ends_with(TEMP_SUFFIX));
        if is_temp && path.is_file() {
            fs::remove_file(&path)?;
            debug!(path = %path.display(), "removed temporary file");
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ShelfStore) {
        let dir = TempDir::new().unwrap();
        let store = ShelfStore::new(dir.path().join("shelf"));
        (dir, store)
    }

    fn source(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn add_creates_root_on_demand() {
        let (tmp, mut store) = setup();
        let src = source(&tmp, "a.txt", b"hello");
        assert!(!store.root().exists());

        store.add("a", &src, "A", None).unwrap();
        assert_eq!(names_in(store.root()), vec!["a"]);
    }

    #[test]
    fn staging_failure_rolls_back() {
        let (_tmp, store) = setup();
        fs::create_dir_all(store.root()).unwrap();
        let target = store.root().join("book_x");

        let result: Result<()> = store.in_staging("book_x", &target, |staging| {
            fs::write(staging.join("book_x.txt"), "partial")?;
            Err(ShelfError::unreadable(Format::Pdf, "simulated"))
        });

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnreadableDocument);
        assert!(!target.exists());
        assert!(names_in(store.root()).is_empty());
    }

    #[test]
    fn staging_io_failure_rolls_back() {
        let (_tmp, store) = setup();
        fs::create_dir_all(store.root()).unwrap();
        let target = store.root().join("book_x");

        let result: Result<()> = store.in_staging("book_x", &target, |staging| {
            write_synced(&staging.join("book_x.txt"), b"partial")?;
            write_synced(&staging.join("missing").join("book_x.json"), b"{}")?;
            Ok(())
        });

        assert_eq!(result.unwrap_err().kind(), ErrorKind::StorageFailure);
        assert!(!target.exists());
        assert!(names_in(store.root()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn add_into_read_only_root_leaves_no_staging() {
        use std::os::unix::fs::PermissionsExt;

        let (tmp, mut store) = setup();
        let src = source(&tmp, "a.txt", b"hello");
        fs::create_dir_all(store.root()).unwrap();
        fs::set_permissions(store.root(), fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits are not enforced for root.
        let writable = fs::create_dir(store.root().join("check")).is_ok();
        if !writable {
            let err = store.add("a", &src, "A", None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StorageFailure);
        }

        fs::set_permissions(store.root(), fs::Permissions::from_mode(0o755)).unwrap();
        let staging: Vec<String> = names_in(store.root())
            .into_iter()
            .filter(|name| name.starts_with(STAGING_PREFIX))
            .collect();
        assert!(staging.is_empty());
    }

    #[test]
    fn item_dir_names() {
        assert_eq!(item_dir_name(Path::new("/s/book_a")), Some("book_a".into()));
        assert_eq!(item_dir_name(Path::new("/s/My Book")), None);
        assert_eq!(item_dir_name(Path::new("/s/.staging-a-1")), None);
    }

    #[test]
    fn staging_success_renames_into_place() {
        let (_tmp, store) = setup();
        fs::create_dir_all(store.root()).unwrap();
        let target = store.root().join("book_y");

        let value = store
            .in_staging("book_y", &target, |staging| {
                fs::write(staging.join("book_y.txt"), "done")?;
                Ok(7)
            })
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(names_in(store.root()), vec!["book_y"]);
        assert_eq!(
            fs::read_to_string(target.join("book_y.txt")).unwrap(),
            "done"
        );
    }

    #[test]
    fn write_atomic_replaces_and_leaves_no_temp() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("x.json"), "old").unwrap();

        write_atomic(tmp.path(), "x.json", b"new").unwrap();

        assert_eq!(fs::read_to_string(tmp.path().join("x.json")).unwrap(), "new");
        assert_eq!(names_in(tmp.path()), vec!["x.json"]);
    }

    #[test]
    fn write_atomic_into_missing_dir_fails_cleanly() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone");
        let err = write_atomic(&missing, "x.json", b"new").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(!missing.exists());
    }

    #[test]
    fn load_item_detects_mismatched_id() {
        let (tmp, mut store) = setup();
        let src = source(&tmp, "a.txt", b"hello");
        store.add("a", &src, "A", None).unwrap();

        let dir = store.root().join("a");
        let json = fs::read_to_string(dir.join("a.json"))
            .unwrap()
            .replace("\"id\": \"a\"", "\"id\": \"b\"");
        fs::write(dir.join("a.json"), json).unwrap();

        let err = store.get("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptItem);
        assert!(err.to_string().contains("belongs to 'b'"));
    }

    #[test]
    fn list_ignores_stray_entries() {
        let (tmp, mut store) = setup();
        let src = source(&tmp, "a.txt", b"hello");
        store.add("a", &src, "A", None).unwrap();
        fs::write(store.root().join("notes.txt"), "not an item").unwrap();
        fs::create_dir(store.root().join(".staging-b-123")).unwrap();
        fs::create_dir(store.root().join("My Book")).unwrap();

        let ids: Vec<String> = store.list().unwrap().map(|item| item.id).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn list_of_missing_root_is_empty() {
        let (_tmp, store) = setup();
        assert_eq!(store.list().unwrap().count(), 0);
    }

    #[test]
    fn doctor_cleans_leftovers_and_reports_corruption() {
        let (tmp, mut store) = setup();
        let txt = source(&tmp, "a.txt", b"hello");
        store.add("a", &txt, "A", None).unwrap();
        store.add("b", &txt, "B", None).unwrap();

        fs::create_dir(store.root().join(".staging-c-0000")).unwrap();
        fs::write(store.root().join("a").join(".a.json.1234.tmp"), "{").unwrap();
        fs::remove_file(store.root().join("b").join("b.txt")).unwrap();

        let report = store.doctor().unwrap();
        assert_eq!(report.healthy, 1);
        assert_eq!(report.removed_staging_dirs, 1);
        assert_eq!(report.removed_temp_files, 1);
        assert_eq!(report.corrupt.len(), 1);
        assert_eq!(report.corrupt[0].0, "b");
        assert!(!report.is_clean());

        assert_eq!(names_in(store.root()), vec!["a", "b"]);
        assert_eq!(names_in(&store.root().join("a")), vec!["a.json", "a.txt"]);
    }

    #[test]
    fn doctor_reports_missing_original_copy() {
        let (tmp, mut store) = setup();
        let txt = source(&tmp, "a.txt", b"hello");
        store.add("a", &txt, "A", None).unwrap();

        let meta_path = store.root().join("a").join("a.json");
        let json = fs::read_to_string(&meta_path)
            .unwrap()
            .replace("\"format\": \"text\"", "\"format\": \"pdf\"");
        fs::write(&meta_path, json).unwrap();

        let report = store.doctor().unwrap();
        assert_eq!(report.healthy, 0);
        assert!(report.corrupt[0].1.contains("missing original copy a.pdf"));
    }

    #[test]
    fn doctor_on_clean_shelf() {
        let (tmp, mut store) = setup();
        let txt = source(&tmp, "a.txt", b"hello");
        store.add("a", &txt, "A", None).unwrap();

        let report = store.doctor().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.healthy, 1);
    }
}
