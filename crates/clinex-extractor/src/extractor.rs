//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::document::DocumentFormat;
use crate::error::ExtractorError;
use crate::normalize::normalize;
use crate::parser::parse_reply;
use crate::prompt::PromptBuilder;
use crate::types::DocumentUpload;
use clinex_domain::traits::LlmProvider;
use clinex_domain::ClinicalRecord;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The Extractor turns clinical notes into normalized records
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: L,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider + Send + Sync,
    L::Error: std::fmt::Display,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a record from an uploaded document
    ///
    /// # Errors
    ///
    /// - `EmptyUpload` if the upload has no bytes
    /// - `UnreadableDocument` if a PDF or DOCX cannot be parsed
    /// - `EmptyText` if the document holds only whitespace
    /// - anything [`Extractor::extract_text`] returns
    pub async fn extract_document(
        &self,
        upload: DocumentUpload,
    ) -> Result<ClinicalRecord, ExtractorError> {
        let DocumentUpload {
            bytes,
            filename,
            content_type,
        } = upload;

        if bytes.is_empty() {
            return Err(ExtractorError::EmptyUpload);
        }

        let format = DocumentFormat::detect(filename.as_deref(), content_type.as_deref());
        info!(
            "Reading {} upload '{}' ({} bytes)",
            format,
            filename.as_deref().unwrap_or("<unnamed>"),
            bytes.len()
        );

        let text = self.read_document(format, bytes).await?;
        let text = text.trim();
        if text.is_empty() {
            warn!("No text found in {} upload", format);
            return Err(ExtractorError::EmptyText);
        }

        self.extract_text(text).await
    }

    async fn read_document(
        &self,
        format: DocumentFormat,
        bytes: Vec<u8>,
    ) -> Result<String, ExtractorError> {
        if format == DocumentFormat::PlainText || !self.config.parse_on_blocking_pool {
            return format.read(&bytes);
        }

        tokio::task::spawn_blocking(move || format.read(&bytes))
            .await
            .map_err(|e| ExtractorError::Task(e.to_string()))?
    }

    /// Extract a record from note text that has already been read
    ///
    /// # Errors
    ///
    /// - `Llm` if the completion call fails
    /// - `InvalidJson` if the reply is not JSON
    /// - `UnexpectedShape` if the reply is JSON but not an object
    pub async fn extract_text(&self, text: &str) -> Result<ClinicalRecord, ExtractorError> {
        let start_time = Instant::now();

        let messages = PromptBuilder::new(text).build();
        debug!("Note length: {} chars", text.chars().count());

        let reply = self
            .llm_provider
            .complete(&messages)
            .await
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        debug!("LLM response length: {} chars", reply.len());

        let data = parse_reply(&reply, self.config.content_sample_chars)?;
        let record = normalize(&data);

        info!(
            "Extraction complete with {}: {} medications, {} diagnoses in {} ms",
            self.llm_provider.model_name(),
            record.medications_taken.len(),
            record.diagnoses.len(),
            start_time.elapsed().as_millis()
        );

        Ok(record)
    }
}
