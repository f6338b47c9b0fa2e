use crate::analysis::ReportSubject;
use crate::canvas::Document;
use crate::capture::CaptureRecord;
use crate::error::ReportError;
use crate::metrics::DocumentMetrics;
use sha2::{Digest, Sha256};
use std::path::Path;

/// The finished, immutable export of one generation.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    file_name: String,
    bytes: Vec<u8>,
    sha256: String,
    document: Document,
    metrics: DocumentMetrics,
    captures: Vec<CaptureRecord>,
}

impl ReportArtifact {
    pub(crate) fn new(
        file_name: String,
        bytes: Vec<u8>,
        document: Document,
        metrics: DocumentMetrics,
        captures: Vec<CaptureRecord>,
    ) -> Self {
        let sha256 = sha256_hex(&bytes);
        Self {
            file_name,
            bytes,
            sha256,
            document,
            metrics,
            captures,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn metrics(&self) -> &DocumentMetrics {
        &self.metrics
    }

    pub fn captures(&self) -> &[CaptureRecord] {
        &self.captures
    }

    /// Writes the PDF into `dir` under its own file name.
    pub fn save_into(&self, dir: impl AsRef<Path>) -> Result<std::path::PathBuf, ReportError> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// `credit-analysis-<customer>-<YYYY-MM-DD>.pdf`; unknown parts are left out.
pub fn report_file_name(subject: &ReportSubject) -> String {
    let mut name = String::from("credit-analysis");
    if let Some(customer) = subject.customer.as_deref().map(file_name_part) {
        if !customer.is_empty() {
            name.push('-');
            name.push_str(&customer);
        }
    }
    if let Some(date) = subject.analysis_date {
        name.push('-');
        name.push_str(&date.format("%Y-%m-%d").to_string());
    }
    name.push_str(".pdf");
    name
}

// Keeps ASCII alphanumerics, '-', '_' and '+'; spaces become '-'.
fn file_name_part(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '+') {
            out.push(ch);
        } else if ch.is_whitespace() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn file_name_includes_known_parts() {
        let subject = ReportSubject::new("+1 555-0101", NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(
            report_file_name(&subject),
            "credit-analysis-+1-555-0101-2024-03-05.pdf"
        );
        let named = ReportSubject::new("Jane Roe/Smith", None);
        assert_eq!(report_file_name(&named), "credit-analysis-Jane-RoeSmith.pdf");
        assert_eq!(
            report_file_name(&ReportSubject::default()),
            "credit-analysis.pdf"
        );
    }

    #[test]
    fn sha256_is_lowercase_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
