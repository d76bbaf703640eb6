use std::fmt;

use thiserror::Error;

/// A file picked by the user, held in memory until submission.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Builds an attachment whose content type is inferred from the extension.
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension including the leading dot, e.g. `.pdf`.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.file_name)
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    #[error("file size must be at most {max_bytes} bytes (got {actual})")]
    TooLarge { max_bytes: u64, actual: u64 },
    #[error("invalid file type {extension}; allowed types: {allowed}")]
    UnsupportedType { extension: String, allowed: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
    pub max_bytes: u64,
    pub accepted_extensions: Vec<String>,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            accepted_extensions: [".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl AttachmentPolicy {
    pub fn check(&self, attachment: &Attachment) -> Result<(), AttachmentError> {
        if attachment.size() > self.max_bytes {
            return Err(AttachmentError::TooLarge {
                max_bytes: self.max_bytes,
                actual: attachment.size(),
            });
        }
        let extension = attachment.extension().unwrap_or_default();
        let accepted = self
            .accepted_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension));
        if !accepted {
            return Err(AttachmentError::UnsupportedType {
                extension,
                allowed: self.accepted_extensions.join(", "),
            });
        }
        Ok(())
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some(".pdf") => "application/pdf",
        Some(".doc") => "application/msword",
        Some(".docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some(".jpg") | Some(".jpeg") => "image/jpeg",
        Some(".png") => "image/png",
        _ => "application/octet-stream",
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
}
