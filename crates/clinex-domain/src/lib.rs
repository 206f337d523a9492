//! Clinex Domain Layer
//!
//! Core types shared by every Clinex crate: the normalized clinical record
//! returned to callers, the chat messages exchanged with a completion model,
//! and the trait seam behind which inference providers live.
//!
//! ## Key Concepts
//!
//! - **ClinicalRecord**: The fixed output schema produced for one uploaded note
//! - **ChatMessage**: A role-tagged message in a chat-completion exchange
//! - **LlmProvider**: Boundary trait implemented by the infrastructure layer
//!
//! ## Architecture
//!
//! - Serialization only (`serde`), no I/O
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod message;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use message::{ChatMessage, Role};
pub use record::{ClinicalRecord, Diagnosis, Medication};
