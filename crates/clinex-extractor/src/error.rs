//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The upload carried no bytes
    #[error("Uploaded file is empty.")]
    EmptyUpload,

    /// The document yielded no text
    #[error("Could not read text from the file.")]
    EmptyText,

    /// The document could not be parsed in its detected format
    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    /// The model reply is not valid JSON
    #[error("Model did not return valid JSON: {message}; content_sample={sample}")]
    InvalidJson {
        /// Parser error message
        message: String,
        /// Leading characters of the offending content
        sample: String,
    },

    /// The model reply is valid JSON but not an object
    #[error("Unexpected reply shape: {0}")]
    UnexpectedShape(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// A background parsing task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_json_message_includes_sample() {
        let err = ExtractorError::InvalidJson {
            message: "expected value at line 1 column 1".to_string(),
            sample: "Sure! Here".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Model did not return valid JSON: expected value at line 1 column 1; content_sample=Sure! Here"
        );
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(ExtractorError::EmptyUpload.to_string(), "Uploaded file is empty.");
        assert_eq!(
            ExtractorError::EmptyText.to_string(),
            "Could not read text from the file."
        );
        assert_eq!(
            ExtractorError::UnreadableDocument("PDF: bad xref".to_string()).to_string(),
            "Unreadable document: PDF: bad xref"
        );
    }
}
