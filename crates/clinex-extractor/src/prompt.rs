//! LLM prompt engineering for clinical field extraction

use clinex_domain::ChatMessage;

/// Instruction fixing the reply to strict JSON with no invented facts
pub const SYSTEM_PROMPT: &str = "You are a medical note information extractor. \
Return ONLY strict JSON (no markdown). \
Use null or [] for missing fields; never invent facts.";

/// Field list and reply shape sent ahead of every note
pub const EXTRACTION_INSTRUCTIONS: &str = r#"
Extract these fields from the clinical note:

- name
- age
- mental_illnesses (array of strings)
- medications_taken (array of objects: name, dose, route, frequency, duration, reason; null if missing)
- past_history (string)
- diagnoses (array of objects: label, code (ICD/DSM) if present, priority one of high/medium/low or null)

Return JSON only with this shape:
{
  "name": null,
  "age": null,
  "mental_illnesses": [],
  "medications_taken": [],
  "past_history": "",
  "diagnoses": []
}
"#;

/// Builds the two-message exchange for one note
pub struct PromptBuilder<'a> {
    note_text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for the given note text
    pub fn new(note_text: &'a str) -> Self {
        Self { note_text }
    }

    /// The user message: instructions followed by the note, verbatim
    pub fn user_prompt(&self) -> String {
        format!(
            "{}\n\nNOTE TEXT:\n\"\"\"{}\"\"\"",
            EXTRACTION_INSTRUCTIONS, self.note_text
        )
    }

    /// Build the system and user messages
    pub fn build(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(self.user_prompt()),
        ]
    }
}
