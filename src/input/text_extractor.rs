//! Direct text extraction from PDF, DOCX and plain text files

use crate::error::ExtractionError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String, ExtractionError>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = fs::read(path).await?;

        // pdf-extract panics on some malformed inputs; a panicking blocking
        // task surfaces as a JoinError instead of unwinding through us.
        let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

        match joined {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::parse("PDF", e)),
            Err(e) if e.is_panic() => Err(ExtractionError::parse("PDF", "parser panicked")),
            Err(e) => Err(ExtractionError::parse("PDF", e)),
        }
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&path)?;
            let mut archive =
                zip::ZipArchive::new(file).map_err(|e| ExtractionError::parse("DOCX", e))?;

            let mut xml = String::new();
            archive
                .by_name("word/document.xml")
                .map_err(|e| ExtractionError::parse("DOCX", e))?
                .read_to_string(&mut xml)
                .map_err(|e| ExtractionError::parse("DOCX", e))?;

            body_paragraphs_text(&xml)
        })
        .await
        .map_err(|e| ExtractionError::parse("DOCX", e))?
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(ExtractionError::parse("text", "not valid UTF-8"))
            }
            Err(e) => Err(ExtractionError::FileAccess(e)),
        }
    }
}

/// Text of the top-level body paragraphs of a WordprocessingML document, one
/// paragraph per line.
///
/// Paragraphs nested in tables, text boxes or content controls are skipped.
/// Within a paragraph only text of its runs (directly or under a hyperlink)
/// is kept.
pub fn body_paragraphs_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(e.name().as_ref().to_vec());
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"w:p" if parent_is(&stack, b"w:body") => text.push('\n'),
                    b"w:tab" if in_paragraph_run(&stack) => text.push('\t'),
                    b"w:br" | b"w:cr" if in_paragraph_run(&stack) => text.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                stack.pop();
                if e.name().as_ref() == b"w:p" && parent_is(&stack, b"w:body") {
                    text.push('\n');
                }
            }
            Ok(Event::Text(ref e)) => {
                if is_run_text(&stack) {
                    let unescaped = e.unescape().map_err(|err| ExtractionError::parse("DOCX", err))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractionError::parse("DOCX", e)),
        }
    }

    Ok(text)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().map(|top| top.as_slice() == name).unwrap_or(false)
}

/// True when the open elements end in `w:body > w:p > [w:hyperlink >] w:r`.
fn in_paragraph_run(stack: &[Vec<u8>]) -> bool {
    let names: Vec<&[u8]> = stack.iter().map(|n| n.as_slice()).collect();
    matches!(
        names.as_slice(),
        [.., b"w:body", b"w:p", b"w:r"] | [.., b"w:body", b"w:p", b"w:hyperlink", b"w:r"]
    )
}

fn is_run_text(stack: &[Vec<u8>]) -> bool {
    match stack.split_last() {
        Some((last, rest)) => last.as_slice() == b"w:t" && in_paragraph_run(rest),
        None => false,
    }
}
