use super::Extractor;
use crate::error::{Result, ShelfError};
use crate::model::Format;

pub struct TextExtractor;

impl Extractor for TextExtractor {
    fn format(&self) -> Format {
        Format::Text
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ShelfError::unreadable(
                Format::Text,
                format!("invalid UTF-8 at byte {}", e.valid_up_to()),
            )
        })?;
        Ok(text.to_string())
    }
}
