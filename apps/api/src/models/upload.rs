use std::path::{Path, PathBuf};

/// Document formats the gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Pdf,
    Doc,
    Docx,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [DocumentType::Pdf, DocumentType::Doc, DocumentType::Docx];

    pub fn media_type(self) -> &'static str {
        match self {
            DocumentType::Pdf => "application/pdf",
            DocumentType::Doc => "application/msword",
            DocumentType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Doc => "doc",
            DocumentType::Docx => "docx",
        }
    }

    /// Matches a declared `Content-Type`, ignoring parameters and case.
    pub fn from_media_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.media_type() == essence)
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.extension() == ext)
    }
}

/// A validated upload persisted in the staging directory.
#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub original_filename: String,
    pub stored_path: PathBuf,
    pub document_type: DocumentType,
    pub size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_ignores_parameters_and_case() {
        assert_eq!(
            DocumentType::from_media_type("Application/PDF; charset=binary"),
            Some(DocumentType::Pdf)
        );
    }

    #[test]
    fn test_word_xml_media_type() {
        assert_eq!(
            DocumentType::from_media_type(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(DocumentType::Docx)
        );
    }

    #[test]
    fn test_text_plain_is_rejected() {
        assert_eq!(DocumentType::from_media_type("text/plain"), None);
        assert_eq!(DocumentType::from_file_name("resume.txt"), None);
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        assert_eq!(DocumentType::from_file_name("CV.DOC"), Some(DocumentType::Doc));
        assert_eq!(DocumentType::from_file_name("no_extension"), None);
    }
}
