//! Plain-text extraction from uploaded resume files.
//!
//! Every extractor returns an empty string on failure; the upload pipeline
//! treats empty/whitespace-only output as a per-file extraction error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

/// Dispatches on the declared file type. Unknown types yield an empty string.
pub fn extract_resume_text(path: &Path, file_type: &str) -> String {
    match file_type {
        "pdf" => extract_text_from_pdf(path),
        "docx" => extract_text_from_docx(path),
        "txt" => extract_text_from_txt(path),
        _ => String::new(),
    }
}

fn extract_text_from_pdf(path: &Path) -> String {
    match pdf_extract::extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error reading PDF {}: {e}", path.display());
            String::new()
        }
    }
}

/// A DOCX is a zip archive; the document body lives in `word/document.xml`.
fn extract_text_from_docx(path: &Path) -> String {
    let xml = match read_docx_document_xml(path) {
        Ok(xml) => xml,
        Err(e) => {
            warn!("Error reading DOCX {}: {e}", path.display());
            return String::new();
        }
    };
    docx_xml_to_text(&xml)
}

fn read_docx_document_xml(path: &Path) -> anyhow::Result<String> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut entry = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Collects the `<w:t>` text runs of a WordprocessingML body, joining
/// paragraphs with newlines. Returns what was decoded so far (possibly
/// nothing) if the XML is malformed.
fn docx_xml_to_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => match t.unescape() {
                Ok(text) => out.push_str(&text),
                Err(e) => {
                    warn!("Bad entity in DOCX text run: {e}");
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("Malformed DOCX XML: {e}");
                break;
            }
            _ => {}
        }
    }

    out
}

fn extract_text_from_txt(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Error reading TXT {}: {e}", path.display());
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCX_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Python &amp; ML engineer</w:t></w:r></w:p>
    <w:p><w:r><w:t>01/2020 - Present</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_docx_xml_paragraphs_joined_with_newlines() {
        let text = docx_xml_to_text(DOCX_BODY);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Jane Doe", "Python & ML engineer", "01/2020 - Present"]);
    }

    #[test]
    fn test_docx_xml_unescapes_entities() {
        let xml = r#"<w:p><w:r><w:t>C&lt;T&gt; &amp; friends</w:t></w:r></w:p>"#;
        assert_eq!(docx_xml_to_text(xml), "C<T> & friends\n");
    }

    #[test]
    fn test_docx_xml_ignores_non_text_elements() {
        let xml = r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:tab/><w:t>body</w:t></w:r></w:p>"#;
        assert_eq!(docx_xml_to_text(xml), "body\n");
    }

    #[test]
    fn test_docx_xml_malformed_returns_partial() {
        let xml = "<w:p><w:r><w:t>ok</w:t></w:r></w:p><w:p><w:r><w:t>trunc";
        let text = docx_xml_to_text(xml);
        assert!(text.starts_with("ok"));
    }

    #[test]
    fn test_txt_extraction_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "plain resume text with python").unwrap();
        let text = extract_resume_text(file.path(), "txt");
        assert_eq!(text, "plain resume text with python");
    }

    #[test]
    fn test_txt_missing_file_yields_empty() {
        let text = extract_resume_text(Path::new("/nonexistent/resume.txt"), "txt");
        assert!(text.is_empty());
    }

    #[test]
    fn test_unknown_type_yields_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "whatever").unwrap();
        assert!(extract_resume_text(file.path(), "exe").is_empty());
    }

    #[test]
    fn test_docx_end_to_end_via_zip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        {
            let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(DOCX_BODY.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        let text = extract_resume_text(file.path(), "docx");
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Python & ML engineer"));
    }

    #[test]
    fn test_docx_not_a_zip_yields_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "this is not a zip archive").unwrap();
        assert!(extract_resume_text(file.path(), "docx").is_empty());
    }
}
