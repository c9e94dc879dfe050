use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Document formats a shelf knows how to extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Pdf,
    Epub,
    Text,
}

impl Format {
    /// Picks the format from the file extension, case-insensitively.
    /// Anything that is not `.pdf` or `.epub` is treated as text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "pdf" => Format::Pdf,
            "epub" => Format::Epub,
            _ => Format::Text,
        }
    }

    /// Extension of the stored original copy. Text items keep no copy: the
    /// extracted `.txt` file already is the original.
    pub fn original_extension(&self) -> Option<&'static str> {
        match self {
            Format::Pdf => Some("pdf"),
            Format::Epub => Some("epub"),
            Format::Text => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Epub => "epub",
            Format::Text => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shelf entry, persisted as `<id>/<id>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub format: Format,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source_filename: String,
}

impl Item {
    pub fn new(
        id: String,
        title: String,
        memo: Option<String>,
        format: Format,
        source_filename: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            memo,
            format,
            created_at: now,
            updated_at: now,
            source_filename,
        }
    }

    /// Applies the supplied fields and bumps `updated_at`.
    pub fn apply(&mut self, update: &ItemUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(memo) = &update.memo {
            self.memo = Some(memo.clone());
        }
        self.touch();
    }

    /// Refreshes `updated_at`, guaranteeing it moves forward even when the
    /// clock has not ticked since the previous write.
    pub fn touch(&mut self) {
        let now = Utc::now();
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = if now > self.updated_at { now } else { floor };
    }

    pub fn text_filename(&self) -> String {
        format!("{}.txt", self.id)
    }

    pub fn metadata_filename(&self) -> String {
        format!("{}.json", self.id)
    }

    pub fn original_filename(&self) -> Option<String> {
        self.format
            .original_extension()
            .map(|ext| format!("{}.{}", self.id, ext))
    }
}

/// Partial edit of an item. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub memo: Option<String>,
}

impl ItemUpdate {
    pub fn new(title: Option<String>, memo: Option<String>) -> Self {
        Self { title, memo }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            memo: None,
        }
    }

    pub fn memo(memo: impl Into<String>) -> Self {
        Self {
            title: None,
            memo: Some(memo.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.memo.is_none()
    }
}
