//! Text extraction from uploaded CV documents.
//!
//! Supports plain text, PDF, and DOCX, detected by file extension. The
//! extracted text only feeds analysis, so extraction is best-effort: callers
//! treat any error as "no extractable text" rather than failing the upload.

use std::io::{BufReader, Cursor};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Extracts text from an uploaded document based on its file extension.
pub fn extract_text(file_name: &str, data: &[u8]) -> Result<String, ExtractError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "txt" => Ok(String::from_utf8_lossy(data).into_owned()),
        "pdf" => extract_pdf(data),
        "docx" => extract_docx(data),
        other => Err(ExtractError::UnsupportedFormat(other.to_string())),
    }
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract can panic on malformed PDFs — wrap in catch_unwind
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Failed(format!("PDF: {e}"))),
        Err(_) => Err(ExtractError::Failed(
            "PDF extraction panicked (malformed file)".to_string(),
        )),
    }
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    // DOCX = ZIP archive containing word/document.xml.
    // Walk <w:t> tags to collect text runs, one line per paragraph.
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| ExtractError::Failed(format!("DOCX zip: {e}")))?;

    let document = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Failed(format!("DOCX missing document.xml: {e}")))?;

    let mut reader = quick_xml::Reader::from_reader(BufReader::new(document));
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(quick_xml::events::Event::End(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = false;
                } else if e.local_name().as_ref() == b"p" && !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            Ok(quick_xml::events::Event::Text(ref e)) => {
                if in_text_run {
                    if let Ok(s) = e.unescape() {
                        text.push_str(&s);
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Failed(format!("DOCX XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_docx(document_xml: &str) -> Vec<u8> {
        let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        archive
            .start_file("word/document.xml", options)
            .unwrap();
        archive.write_all(document_xml.as_bytes()).unwrap();
        archive.finish().unwrap().into_inner()
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = extract_text("notes.txt", "hello world".as_bytes()).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_plain_text_is_lossy_on_bad_utf8() {
        let text = extract_text("notes.txt", &[0x68, 0x69, 0xFF]).unwrap();
        assert!(text.starts_with("hi"));
    }

    #[test]
    fn test_docx_collects_text_runs() {
        let xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>Senior engineer,</w:t></w:r><w:r><w:t> ten years</w:t></w:r></w:p>
                <w:p><w:r><w:t>Budget owner</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;
        let text = extract_text("cv.docx", &make_docx(xml)).unwrap();
        assert!(text.contains("Senior engineer, ten years"));
        assert!(text.contains("Budget owner"));
    }

    #[test]
    fn test_docx_without_document_xml_fails() {
        let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        archive.start_file("other.xml", options).unwrap();
        archive.write_all(b"<x/>").unwrap();
        let data = archive.finish().unwrap().into_inner();

        assert!(matches!(
            extract_text("cv.docx", &data),
            Err(ExtractError::Failed(_))
        ));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            extract_text("photo.png", &[1, 2, 3]),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_extension_detection_is_case_insensitive() {
        let text = extract_text("NOTES.TXT", b"ok").unwrap();
        assert_eq!(text, "ok");
    }
}
