//! Uploaded property documents

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

/// Text extraction state of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl DocumentStatus {
    /// Whether extraction has finished, successfully or not
    pub fn is_settled(&self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Error)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Pending => write!(f, "pending"),
            DocumentStatus::Processing => write!(f, "processing"),
            DocumentStatus::Completed => write!(f, "completed"),
            DocumentStatus::Error => write!(f, "error"),
        }
    }
}

/// A document held in the upload session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Identifier assigned at upload time
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    pub status: DocumentStatus,
    /// Client-side envelope of `text_content`; stays in the browser
    #[serde(skip)]
    pub envelope: Option<Envelope>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            text_content: None,
            status: DocumentStatus::Pending,
            envelope: None,
        }
    }

    /// Extracted text, if any was read and it is non-empty
    pub fn readable_text(&self) -> Option<&str> {
        self.text_content
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    pub fn file_type(&self) -> Option<AcceptedFileType> {
        AcceptedFileType::from_name_or_mime(&self.name, &self.mime_type)
    }
}

/// Readable texts of `documents`, in order, separated by a blank line
pub fn join_readable_text<'a>(documents: impl IntoIterator<Item = &'a Document>) -> String {
    documents
        .into_iter()
        .filter_map(Document::readable_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// File types the upload widget accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptedFileType {
    Text,
    Pdf,
    Doc,
    Docx,
}

impl AcceptedFileType {
    pub const ALL: [AcceptedFileType; 4] = [
        AcceptedFileType::Text,
        AcceptedFileType::Pdf,
        AcceptedFileType::Doc,
        AcceptedFileType::Docx,
    ];

    pub fn mime_type(&self) -> &'static str {
        match self {
            AcceptedFileType::Text => "text/plain",
            AcceptedFileType::Pdf => "application/pdf",
            AcceptedFileType::Doc => "application/msword",
            AcceptedFileType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AcceptedFileType::Text => "txt",
            AcceptedFileType::Pdf => "pdf",
            AcceptedFileType::Doc => "doc",
            AcceptedFileType::Docx => "docx",
        }
    }

    /// Classify by MIME type first, then by file extension.
    /// Browsers report an empty MIME type for unknown files.
    pub fn from_name_or_mime(name: &str, mime_type: &str) -> Option<Self> {
        let mime = mime_type.trim().to_ascii_lowercase();
        if let Some(found) = Self::ALL.into_iter().find(|t| t.mime_type() == mime) {
            return Some(found);
        }

        let (_, ext) = name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.extension() == ext)
    }
}
