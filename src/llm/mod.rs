//! Language-model capability: reply generation and document explanation.

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiClient;

use crate::language::Language;
use crate::Result;
use async_trait::async_trait;

/// The two outbound generative calls the session controller makes. An `Err`
/// is the failure signal; the controller decides whether it is surfaced.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a reply to a user utterance, given the serialized recent
    /// conversation as context.
    async fn generate_reply(
        &self,
        message: &str,
        language: Language,
        context: &str,
    ) -> Result<String>;

    /// Explain a document or photo in the user's language.
    async fn explain_document(
        &self,
        data: &[u8],
        mime_type: &str,
        language: Language,
    ) -> Result<String>;
}
