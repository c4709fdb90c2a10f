//! Text extraction from uploaded book files.
//!
//! PDFs are extracted with `pdftotext` (poppler-utils); everything else is
//! read as UTF-8 text with lossy decoding. Extraction always produces a list
//! of pages so the quick-mode truncation can work uniformly: `pdftotext`
//! separates pages with form feeds, and plain text files are treated the
//! same way (usually a single page).

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use tome_core::{defaults, Error, Result};

/// Timeout for a single `pdftotext` invocation.
const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 120;

/// Extract the text of an uploaded file as a list of pages.
pub async fn extract_pages(path: &Path) -> Result<Vec<String>> {
    let header = read_header(path).await?;

    let text = if header.starts_with(b"%PDF") {
        extract_pdf_text(path).await?
    } else {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Job(format!("Failed to read upload {}: {}", path.display(), e)))?;
        String::from_utf8_lossy(&bytes).into_owned()
    };

    let pages = split_pages(&text);
    debug!(
        subsystem = "jobs",
        component = "extract",
        page_count = pages.len(),
        "Extracted document text"
    );
    Ok(pages)
}

/// Join pages into the pipeline input. Quick mode keeps only the first
/// [`defaults::QUICK_PAGE_LIMIT`] pages.
pub fn assemble_text(pages: &[String], quick: bool) -> String {
    let limit = if quick {
        defaults::QUICK_PAGE_LIMIT.min(pages.len())
    } else {
        pages.len()
    };
    pages[..limit].join("\n")
}

/// Read the first few bytes of a file for format sniffing.
async fn read_header(path: &Path) -> Result<Vec<u8>> {
    use tokio::io::AsyncReadExt;

    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| Error::Job(format!("Failed to open upload {}: {}", path.display(), e)))?;
    let mut header = [0u8; 4];
    let n = file
        .read(&mut header)
        .await
        .map_err(|e| Error::Job(format!("Failed to read upload {}: {}", path.display(), e)))?;
    Ok(header[..n].to_vec())
}

/// Run `pdftotext` on the file, returning its stdout.
async fn extract_pdf_text(path: &Path) -> Result<String> {
    let mut cmd = Command::new("pdftotext");
    cmd.arg(path).arg("-");

    let output = tokio::time::timeout(
        Duration::from_secs(EXTRACTION_CMD_TIMEOUT_SECS),
        cmd.output(),
    )
    .await
    .map_err(|_| {
        Error::Job(format!(
            "pdftotext timed out after {}s",
            EXTRACTION_CMD_TIMEOUT_SECS
        ))
    })?
    .map_err(|e| Error::Job(format!("Failed to execute pdftotext: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            subsystem = "jobs",
            component = "extract",
            exit = %output.status,
            "pdftotext failed"
        );
        return Err(Error::Job(format!(
            "pdftotext failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Split extracted text on form feeds into trimmed, non-empty pages.
fn split_pages(text: &str) -> Vec<String> {
    text.split('\u{c}')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = split_pages("Page one.\u{c}Page two.\u{c}\u{c}  \u{c}Page three.");
        assert_eq!(pages, vec!["Page one.", "Page two.", "Page three."]);
    }

    #[test]
    fn test_split_pages_plain_text_is_one_page() {
        let pages = split_pages("Just a text file.\nWith two lines.");
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_assemble_text_quick_truncates() {
        let pages: Vec<String> = (1..=15).map(|i| format!("Page {}", i)).collect();
        let quick = assemble_text(&pages, true);
        assert!(quick.contains("Page 10"));
        assert!(!quick.contains("Page 11"));

        let full = assemble_text(&pages, false);
        assert!(full.contains("Page 15"));
    }

    #[test]
    fn test_assemble_text_quick_with_few_pages() {
        let pages = vec!["Only page".to_string()];
        assert_eq!(assemble_text(&pages, true), "Only page");
    }

    #[tokio::test]
    async fn test_extract_pages_plain_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Hello from a plain text upload.").unwrap();

        let pages = extract_pages(file.path()).await.unwrap();
        assert_eq!(pages, vec!["Hello from a plain text upload."]);
    }

    #[tokio::test]
    async fn test_extract_pages_missing_file_is_job_error() {
        let err = extract_pages(Path::new("/nonexistent/upload.bin"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Job(_)));
    }
}
