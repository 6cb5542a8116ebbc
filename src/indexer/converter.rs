//! Rich-document conversion to markdown text.
//!
//! The indexing flow only depends on the [`DocumentConverter`] trait;
//! the built-in converter handles the document extension set
//! (PDF/DOCX/PPTX/XLSX/HTML) and is compiled under the `docs` feature.

use std::path::Path;

use crate::error::Result;

/// `convert: path → markdown string`. Any failure is treated uniformly
/// as "file skipped" by the document indexing flow.
pub trait DocumentConverter {
    fn convert(&self, path: &Path) -> Result<String>;
}

#[cfg(feature = "docs")]
pub use native::MarkdownConverter;

#[cfg(feature = "docs")]
mod native {
    use std::io::Read;
    use std::path::Path;

    use calamine::Reader;

    use super::DocumentConverter;
    use crate::error::{Result, SidecarError};

    /// Built-in converter for the supported document formats.
    pub struct MarkdownConverter;

    impl MarkdownConverter {
        pub fn new() -> Self {
            Self
        }
    }

    impl Default for MarkdownConverter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DocumentConverter for MarkdownConverter {
        fn convert(&self, path: &Path) -> Result<String> {
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            match extension.as_str() {
                "pdf" => convert_pdf(path),
                "docx" => convert_docx(path),
                "pptx" => convert_pptx(path),
                "xlsx" => convert_spreadsheet(path),
                "html" => convert_html(path),
                _ => Err(SidecarError::Convert(format!(
                    "Unsupported document type: {extension}"
                ))),
            }
        }
    }

    fn convert_pdf(path: &Path) -> Result<String> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| SidecarError::Convert(format!("Failed to parse PDF: {e}")))?;

        let mut text = String::new();
        for page_num in doc.get_pages().keys() {
            if let Ok(content) = doc.extract_text(&[*page_num]) {
                text.push_str(&content);
                text.push('\n');
            }
        }
        Ok(text)
    }

    /// DOCX stores text runs in `word/document.xml` as `<w:t>` elements.
    fn convert_docx(path: &Path) -> Result<String> {
        let xml = read_zip_entry(path, "word/document.xml")?;
        Ok(extract_text_runs(&xml, "w:t", "w:p"))
    }

    /// PPTX keeps one XML per slide under `ppt/slides/`, with text runs
    /// in `<a:t>` elements. Slides are emitted in numeric order.
    fn convert_pptx(path: &Path) -> Result<String> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(std::io::BufReader::new(file))
            .map_err(|e| SidecarError::Convert(format!("Failed to read PPTX archive: {e}")))?;

        let mut slide_names: Vec<String> = (0..archive.len())
            .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .collect();
        slide_names.sort_by_key(|name| slide_number(name));

        let mut text = String::new();
        for name in slide_names {
            let mut xml = String::new();
            archive
                .by_name(&name)
                .map_err(|e| SidecarError::Convert(format!("Failed to read {name}: {e}")))?
                .read_to_string(&mut xml)?;
            text.push_str(&extract_text_runs(&xml, "a:t", "a:p"));
            text.push('\n');
        }
        Ok(text)
    }

    fn slide_number(name: &str) -> u32 {
        name.trim_start_matches("ppt/slides/slide")
            .trim_end_matches(".xml")
            .parse()
            .unwrap_or(0)
    }

    fn convert_spreadsheet(path: &Path) -> Result<String> {
        let mut workbook: calamine::Sheets<std::io::BufReader<std::fs::File>> =
            calamine::open_workbook_auto(path)
                .map_err(|e| SidecarError::Convert(format!("Failed to open spreadsheet: {e}")))?;

        let mut text = String::new();
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        for name in sheet_names {
            if let Ok(range) = workbook.worksheet_range(&name) {
                text.push_str(&format!("## {name}\n\n"));
                for row in range.rows() {
                    let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
                    text.push_str(&cells.join(" | "));
                    text.push('\n');
                }
                text.push('\n');
            }
        }
        Ok(text)
    }

    fn convert_html(path: &Path) -> Result<String> {
        let html = std::fs::read_to_string(path)?;
        Ok(strip_html(&html))
    }

    fn read_zip_entry(path: &Path, entry: &str) -> Result<String> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(std::io::BufReader::new(file))
            .map_err(|e| SidecarError::Convert(format!("Failed to read archive: {e}")))?;
        let mut content = String::new();
        archive
            .by_name(entry)
            .map_err(|e| SidecarError::Convert(format!("Missing {entry}: {e}")))?
            .read_to_string(&mut content)?;
        Ok(content)
    }

    /// Collect the character data of every `<{text_tag}>` element,
    /// inserting newlines at `</{para_tag}>` boundaries.
    fn extract_text_runs(xml: &str, text_tag: &str, para_tag: &str) -> String {
        let open_prefix = format!("<{text_tag}");
        let close_tag = format!("</{text_tag}>");
        let para_close = format!("</{para_tag}>");

        let mut text = String::new();
        let mut pending_break = false;
        let mut rest = xml;
        loop {
            let Some(open) = rest.find(&open_prefix) else {
                break;
            };
            // Paragraph boundaries before this run become newlines.
            if rest[..open].contains(&para_close) {
                pending_break = true;
            }
            let after_open = &rest[open + open_prefix.len()..];
            // The prefix also matches longer tag names (`<w:tbl`,
            // `<w:tab`); require a real delimiter.
            if !matches!(after_open.as_bytes().first(), Some(b'>') | Some(b' ') | Some(b'/')) {
                rest = after_open;
                continue;
            }
            let Some(tag_end) = after_open.find('>') else {
                break;
            };
            // Self-closing run: no character data.
            if after_open[..tag_end].ends_with('/') {
                rest = &after_open[tag_end + 1..];
                continue;
            }
            let body = &after_open[tag_end + 1..];
            let Some(close) = body.find(&close_tag) else {
                break;
            };
            if pending_break && !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            pending_break = false;
            text.push_str(&unescape_xml(&body[..close]));
            rest = &body[close + close_tag.len()..];
        }
        text
    }

    fn strip_html(html: &str) -> String {
        let mut text = String::new();
        let mut rest = html;
        while let Some(open) = rest.find('<') {
            text.push_str(&rest[..open]);
            let after = &rest[open..];
            if let Some(end) =
                skip_raw_block(after, "script").or_else(|| skip_raw_block(after, "style"))
            {
                rest = &after[end..];
                continue;
            }
            match after.find('>') {
                Some(close) => {
                    if !text.is_empty() && !text.ends_with('\n') && is_block_tag(&after[1..close]) {
                        text.push('\n');
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    rest = "";
                }
            }
        }
        text.push_str(rest);
        unescape_xml(&text)
    }

    /// Byte length of a raw `<script>`/`<style>` block at the start of
    /// `s`, including its closing tag. ASCII-lowercasing keeps byte
    /// offsets valid on the original slice.
    fn skip_raw_block(s: &str, tag: &str) -> Option<usize> {
        let open = format!("<{tag}");
        if s.len() < open.len() || !s[..open.len()].eq_ignore_ascii_case(&open) {
            return None;
        }
        let close = format!("</{tag}>");
        let lower = s.to_ascii_lowercase();
        Some(lower.find(&close).map_or(s.len(), |pos| pos + close.len()))
    }

    fn is_block_tag(tag: &str) -> bool {
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        matches!(
            name.as_str(),
            "p" | "div" | "br" | "li" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        )
    }

    fn unescape_xml(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&")
    }

}
