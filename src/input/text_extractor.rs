//! Text extraction from various file formats

use crate::error::{Result, ResumeScorerError};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::sync::OnceLock;

/// Turns raw document bytes into plain text
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8], source: &str) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8], source: &str) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            ResumeScorerError::PdfExtraction(format!(
                "Failed to extract text from PDF '{}': {}",
                source, e
            ))
        })?;
        Ok(collapse_page_whitespace(&text))
    }
}

/// Collapse whitespace runs inside each page; pages are joined by a blank line.
pub fn collapse_page_whitespace(text: &str) -> String {
    text.split('\u{c}')
        .map(|page| page.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], source: &str) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            ResumeScorerError::InvalidInput(format!("'{}' is not valid UTF-8: {}", source, e))
        })
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8], source: &str) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract(bytes, source)?;

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(Self::html_to_text(&html_output))
    }
}

impl MarkdownExtractor {
    fn html_to_text(html: &str) -> String {
        static TAG: OnceLock<Regex> = OnceLock::new();
        let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

        // Block ends become sentence breaks so headings and list items
        // do not run into each other when segmenting.
        let text = html
            .replace("<br />", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n")
            .replace("</h1>", "\n")
            .replace("</h2>", "\n")
            .replace("</h3>", "\n");

        let clean_text = tag.replace_all(&text, "");
        let clean_text = clean_text
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");

        clean_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_page_whitespace() {
        let text = "Jane   Doe\n\nSenior\tEngineer\u{c}Page two\n text\u{c}   ";
        assert_eq!(
            collapse_page_whitespace(text),
            "Jane Doe Senior Engineer\n\nPage two text"
        );
    }

    #[test]
    fn test_markdown_strips_formatting() {
        let md = b"# Jane Doe\n\n**Rust** engineer &amp; mentor.\n\n- Built `tokio` services\n- Led a team\n";
        let text = MarkdownExtractor.extract(md, "resume.md").unwrap();

        assert!(text.starts_with("Jane Doe\n"));
        assert!(text.contains("Rust engineer & mentor."));
        assert!(text.contains("Built tokio services"));
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_plain_text_rejects_invalid_utf8() {
        assert!(PlainTextExtractor.extract(&[0xff, 0xfe, 0x00], "bad.txt").is_err());
    }

    #[test]
    fn test_pdf_garbage_is_an_error() {
        let err = PdfExtractor.extract(b"not a pdf", "resume.pdf").unwrap_err();
        assert!(matches!(err, ResumeScorerError::PdfExtraction(_)));
    }
}
