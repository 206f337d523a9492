//! Request types for extraction

/// A document as received from a client
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    /// Raw file bytes
    pub bytes: Vec<u8>,

    /// Client-supplied filename, if any
    pub filename: Option<String>,

    /// Declared MIME type, if any
    pub content_type: Option<String>,
}

impl DocumentUpload {
    /// Create an upload with no filename or content type
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            filename: None,
            content_type: None,
        }
    }

    /// Set the filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the declared content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
