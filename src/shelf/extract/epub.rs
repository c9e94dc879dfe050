//! EPUB text extraction.
//!
//! An EPUB is a ZIP container. `META-INF/container.xml` points at the OPF package
//! document, whose `<manifest>` lists the resources and whose `<spine>` gives the
//! reading order. Content documents are read in spine order (never archive
//! order) and reduced to plain text.

use super::Extractor;
use crate::error::{Result, ShelfError};
use crate::model::Format;
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const CONTAINER_PATH: &str = "META-INF/container.xml";
const DOCUMENT_SEPARATOR: &str = "\n";

const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "template", "noscript"];
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tr",
    "ul",
];

pub struct EpubExtractor;

impl Extractor for EpubExtractor {
    fn format(&self) -> Format {
        Format::Epub
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| unreadable(format!("not a valid container: {}", e)))?;

        let container = read_entry(&mut archive, CONTAINER_PATH)?;
        let opf_path = rootfile_path(&container)?;
        let opf = read_entry(&mut archive, &opf_path)?;
        let package = Package::parse(&opf)?;
        let base_dir = parent_dir(&opf_path);

        let mut documents = Vec::new();
        for item in package.reading_order()? {
            if !item.is_html() {
                tracing::debug!(href = %item.href, media_type = %item.media_type, "skipping non-html spine item");
                continue;
            }

            let path = resolve_href(base_dir, &item.href);
            let raw = read_entry(&mut archive, &path)?;
            let text = document_text(&String::from_utf8_lossy(&raw));
            if !text.is_empty() {
                documents.push(text);
            }
        }

        tracing::debug!(documents = documents.len(), "extracted epub");
        Ok(documents.join(DOCUMENT_SEPARATOR))
    }
}

fn unreadable(reason: impl std::fmt::Display) -> ShelfError {
    ShelfError::unreadable(Format::Epub, reason)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| unreadable(format!("missing '{}': {}", name, e)))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .map_err(|e| unreadable(format!("cannot read '{}': {}", name, e)))?;
    Ok(buf)
}

fn xml_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string()
}

fn parse_xml(text: &str) -> Result<roxmltree::Document<'_>> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    roxmltree::Document::parse_with_options(text, options)
        .map_err(|e| unreadable(format!("malformed xml: {}", e)))
}

/// Location of the OPF package document, from `META-INF/container.xml`.
fn rootfile_path(container: &[u8]) -> Result<String> {
    let text = xml_text(container);
    let doc = parse_xml(&text)?;
    doc.descendants()
        .filter(|n| n.has_tag_name("rootfile"))
        .find_map(|n| n.attribute("full-path"))
        .map(|p| p.trim_start_matches('/').to_string())
        .ok_or_else(|| unreadable("container.xml names no rootfile"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ManifestItem {
    href: String,
    media_type: String,
}

impl ManifestItem {
    fn is_html(&self) -> bool {
        match self.media_type.as_str() {
            "application/xhtml+xml" | "text/html" => true,
            "" => {
                let href = self.href.to_ascii_lowercase();
                href.ends_with(".xhtml") || href.ends_with(".html") || href.ends_with(".htm")
            }
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct Package {
    manifest: HashMap<String, ManifestItem>,
    spine: Option<Vec<String>>,
}

impl Package {
    fn parse(opf: &[u8]) -> Result<Self> {
        let text = xml_text(opf);
        let doc = parse_xml(&text)?;
        let mut package = Package::default();

        for node in doc.descendants() {
            if node.has_tag_name("manifest") {
                for item in node.children().filter(|n| n.has_tag_name("item")) {
                    let (Some(id), Some(href)) = (item.attribute("id"), item.attribute("href"))
                    else {
                        continue;
                    };
                    package.manifest.insert(
                        id.to_string(),
                        ManifestItem {
                            href: href.to_string(),
                            media_type: item.attribute("media-type").unwrap_or("").to_string(),
                        },
                    );
                }
            } else if node.has_tag_name("spine") {
                let idrefs = node
                    .children()
                    .filter(|n| n.has_tag_name("itemref"))
                    .filter_map(|n| n.attribute("idref"))
                    .map(str::to_string)
                    .collect();
                package.spine = Some(idrefs);
            }
        }

        Ok(package)
    }

    fn reading_order(&self) -> Result<Vec<&ManifestItem>> {
        let spine = match &self.spine {
            Some(spine) if !spine.is_empty() => spine,
            _ => return Err(unreadable("package has no reading order (empty or missing spine)")),
        };

        spine
            .iter()
            .map(|idref| {
                self.manifest.get(idref).ok_or_else(|| {
                    unreadable(format!("spine references unknown manifest item '{}'", idref))
                })
            })
            .collect()
    }
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[..idx]).unwrap_or("")
}

/// Resolves a manifest href against the directory of the package document.
fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let href = percent_decode(href);

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Plain text of an (X)HTML content document.
fn document_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let body = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .unwrap_or(root);

    let mut raw = String::new();
    collect_text(body, &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Trims every line and keeps at most one blank line between paragraphs.
fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::new();
    let mut blank_run = 0;
    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = 0;
    }
    out
}
