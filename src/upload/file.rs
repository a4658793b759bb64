//! Candidate files and their descriptors.

use axum::body::Bytes;
use serde::Serialize;

/// The only MIME type the upload control accepts.
pub const PDF_MIME: &str = "application/pdf";

/// Name, size and MIME type of a selected file. Carries no content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    name: String,
    size: u64,
    mime_type: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(PDF_MIME)
    }
}

/// A file handed to the upload control: descriptor plus raw bytes.
///
/// Only the descriptor travels upward; the bytes go to the upload sink.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    descriptor: FileDescriptor,
    bytes: Bytes,
}

impl CandidateFile {
    /// Build a candidate from what the browser sent.
    ///
    /// When no MIME type was declared it is guessed from the file name, the
    /// way browsers derive `File.type`. Unknown extensions yield an empty type.
    pub fn new(name: impl Into<String>, declared_mime: Option<&str>, bytes: Bytes) -> Self {
        let name = name.into();
        let mime_type = declared_mime
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToString::to_string)
            .or_else(|| {
                mime_guess::from_path(&name)
                    .first_raw()
                    .map(ToString::to_string)
            })
            .unwrap_or_default();

        Self {
            descriptor: FileDescriptor::new(name, bytes.len() as u64, mime_type),
            bytes,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn into_parts(self) -> (FileDescriptor, Bytes) {
        (self.descriptor, self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_mime_wins() {
        let file = CandidateFile::new("scan.bin", Some("application/pdf"), Bytes::from_static(b"%PDF"));
        assert!(file.descriptor().is_pdf());
        assert_eq!(file.descriptor().size(), 4);
    }

    #[test]
    fn test_mime_guessed_from_extension() {
        let pdf = CandidateFile::new("report.pdf", None, Bytes::new());
        assert_eq!(pdf.descriptor().mime_type(), PDF_MIME);

        let png = CandidateFile::new("image.png", Some("  "), Bytes::new());
        assert_eq!(png.descriptor().mime_type(), "image/png");
        assert!(!png.descriptor().is_pdf());
    }

    #[test]
    fn test_unknown_extension_has_no_type() {
        let file = CandidateFile::new("notes", None, Bytes::new());
        assert_eq!(file.descriptor().mime_type(), "");
        assert!(!file.descriptor().is_pdf());
    }
}
