//! PDF text extraction behind a small trait so the pipeline can run against fakes.

use thiserror::Error;

/// Errors raised while decoding a PDF.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The byte stream could not be parsed as a PDF.
    #[error("failed to extract text from PDF: {0}")]
    Malformed(String),
}

/// Interface implemented by page-oriented text extractors.
pub trait TextExtractor: Send + Sync {
    /// Return the text of every page, in page order. Pages without text yield empty strings.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Extractor backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Construct a new extractor.
    pub const fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|error| ExtractionError::Malformed(error.to_string()))
    }
}

/// Returns true when the filename carries a `.pdf` extension (ASCII case-insensitive).
pub fn has_pdf_extension(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Join page texts, appending a newline after each page that produced any text.
pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for (index, page) in pages.iter().enumerate() {
        if page.is_empty() {
            tracing::debug!(page = index + 1, "Page yielded no text; skipping");
            continue;
        }
        text.push_str(page);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(has_pdf_extension("report.pdf"));
        assert!(has_pdf_extension("REPORT.PDF"));
        assert!(has_pdf_extension("archive.tar.Pdf"));
        assert!(!has_pdf_extension("report.pdf.txt"));
        assert!(!has_pdf_extension("report.docx"));
        assert!(!has_pdf_extension("pdf"));
        assert!(!has_pdf_extension(""));
    }

    #[test]
    fn join_pages_appends_newline_per_page_and_skips_empty() {
        let pages = vec![
            "Hello world.".to_string(),
            String::new(),
            "Second page.".to_string(),
        ];
        assert_eq!(join_pages(&pages), "Hello world.\nSecond page.\n");
    }

    #[test]
    fn whitespace_pages_are_kept_verbatim() {
        let pages = vec!["  ".to_string(), "Text".to_string()];
        assert_eq!(join_pages(&pages), "  \nText\n");
    }

    /// Build a PDF with one page per entry; `None` leaves the page without a text run.
    fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{Document, Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations }.encode().expect("encode content");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("serialize pdf");
        bytes
    }

    #[test]
    fn real_pdf_pages_come_back_in_order_with_blank_pages_skipped() {
        let bytes = pdf_with_pages(&[Some("Hello world."), None, Some("Second page.")]);

        let pages = PdfTextExtractor::new()
            .extract_pages(&bytes)
            .expect("valid pdf");

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].trim(), "Hello world.");
        assert!(pages[1].is_empty(), "blank page yielded {:?}", pages[1]);
        assert_eq!(pages[2].trim(), "Second page.");

        assert_eq!(join_pages(&pages), format!("{}\n{}\n", pages[0], pages[2]));
    }

    #[test]
    fn garbage_bytes_are_reported_as_malformed() {
        let error = PdfTextExtractor::new()
            .extract_pages(b"definitely not a pdf")
            .expect_err("garbage input");
        assert!(matches!(error, ExtractionError::Malformed(_)));
    }
}
