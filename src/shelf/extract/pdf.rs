use super::Extractor;
use crate::error::{Result, ShelfError};
use crate::model::Format;
use std::panic;

pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    fn format(&self) -> Format {
        Format::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // The decoder panics on some malformed inputs instead of returning an error.
        let pages = catch_quietly(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|payload| ShelfError::unreadable(Format::Pdf, panic_message(&*payload)))?
            .map_err(|e| ShelfError::unreadable(Format::Pdf, e))?;

        tracing::debug!(pages = pages.len(), "extracted pdf");
        Ok(pages.join("\n"))
    }
}

/// `catch_unwind` with the panic hook muted, so a caught panic does not
/// print a backtrace notice to stderr.
fn catch_quietly<T>(f: impl FnOnce() -> T + panic::UnwindSafe) -> std::thread::Result<T> {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let outcome = panic::catch_unwind(f);
    panic::set_hook(previous);
    outcome
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("decoder panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("decoder panicked: {}", msg)
    } else {
        "decoder panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = PdfExtractor.extract(b"%PDF-1.4\nthis is not really a pdf").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnreadableDocument);
    }

    #[test]
    fn rejects_empty_input() {
        let err = PdfExtractor.extract(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnreadableDocument);
    }

    #[test]
    fn caught_panics_become_errors() {
        let outcome = catch_quietly(|| -> u8 { panic!("bad xref") });
        let payload = outcome.unwrap_err();
        assert_eq!(panic_message(&*payload), "decoder panicked: bad xref");

        assert_eq!(catch_quietly(|| 7).unwrap(), 7);
    }

    #[test]
    fn panic_payloads_are_described() {
        assert_eq!(panic_message(&"boom"), "decoder panicked: boom");
        assert_eq!(
            panic_message(&String::from("bad xref")),
            "decoder panicked: bad xref"
        );
        assert_eq!(panic_message(&42_u8), "decoder panicked");
    }
}
