//! Clinex Extractor
//!
//! Turns an uploaded clinical note into a normalized `ClinicalRecord` by way
//! of a hosted chat-completion model.
//!
//! # Architecture
//!
//! ```text
//! Upload → document text → prompt → LLM → JSON reply → normalize → ClinicalRecord
//! ```
//!
//! # Key Features
//!
//! - **Format dispatch**: PDF, DOCX or plain text, chosen by filename and content type
//! - **Prompting**: Fixed instruction block with the note text appended verbatim
//! - **Reply repair**: Markdown code fences stripped before JSON parsing
//! - **Normalization**: Field-by-field coercion into a typed, immutable record
//!
//! # Example Usage
//!
//! ```no_run
//! use clinex_extractor::{DocumentUpload, Extractor, ExtractorConfig};
//! use clinex_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"name": "[PATIENT]", "age": 42}"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default());
//!
//! let upload = DocumentUpload::new(b"42 y/o presenting with low mood".to_vec())
//!     .with_filename("note.txt");
//! let record = extractor.extract_document(upload).await?;
//!
//! assert!(record.name.is_none());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
pub mod document;
mod error;
mod extractor;
pub mod normalize;
pub mod parser;
pub mod prompt;
mod types;


pub use config::ExtractorConfig;
pub use document::DocumentFormat;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use normalize::normalize;
pub use parser::parse_reply;
pub use types::DocumentUpload;
