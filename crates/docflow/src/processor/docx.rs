use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ExtractError;
use crate::processor::{DocumentFormat, DocumentProcessor};

/// Reads `word/document.xml` from a DOCX archive. Body paragraphs come first,
/// one per line; table rows follow, with non-empty cells separated by spaces.
pub struct DocxProcessor;

impl DocxProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for DocxProcessor {
    fn process(&self, path: &Path) -> Result<String, ExtractError> {
        let file = std::fs::File::open(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ExtractError::DocxProcessing(format!("Failed to open DOCX: {}", e)))?;

        extract_docx_text(&mut archive)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Docx)
    }
}

fn extract_docx_text<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, ExtractError> {
    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::DocxProcessing(format!("Failed to find document.xml: {}", e)))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| ExtractError::DocxProcessing(format!("Failed to read document.xml: {}", e)))?;

    parse_docx_xml(&xml_content)
}

#[derive(Default)]
struct DocxText {
    paragraphs: String,
    tables: String,
    paragraph: String,
    cell: String,
    table_depth: usize,
    in_text_element: bool,
}

impl DocxText {
    fn end_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.paragraph);
        if self.table_depth > 0 {
            if !self.cell.is_empty() && !paragraph.is_empty() {
                self.cell.push(' ');
            }
            self.cell.push_str(&paragraph);
        } else if !paragraph.trim().is_empty() {
            self.paragraphs.push_str(&paragraph);
            self.paragraphs.push('\n');
        }
    }

    fn end_cell(&mut self) {
        let cell = std::mem::take(&mut self.cell);
        if !cell.trim().is_empty() {
            self.tables.push_str(&cell);
            self.tables.push(' ');
        }
    }

    fn finish(self) -> String {
        format!("{}{}", self.paragraphs, self.tables).trim().to_string()
    }
}

fn parse_docx_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut state = DocxText::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => state.in_text_element = true,
                b"tbl" => state.table_depth += 1,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => state.in_text_element = false,
                b"p" => state.end_paragraph(),
                b"tc" => state.end_cell(),
                b"tr" => state.tables.push('\n'),
                b"tbl" => state.table_depth = state.table_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => state.paragraph.push('\t'),
                b"br" => state.paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if state.in_text_element {
                    let unescaped = e.decode().map_err(|err| {
                        ExtractError::DocxProcessing(format!("XML unescape error: {}", err))
                    })?;
                    state.paragraph.push_str(&unescaped);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if state.in_text_element {
                    let name = e.decode().map_err(|err| {
                        ExtractError::DocxProcessing(format!("XML decoding error: {}", err))
                    })?;
                    if let Some(resolved) = quick_xml::escape::resolve_predefined_entity(&name) {
                        state.paragraph.push_str(resolved);
                    } else if let Ok(Some(ch)) = e.resolve_char_ref() {
                        state.paragraph.push(ch);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::DocxProcessing(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(state.finish())
}
