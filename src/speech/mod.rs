//! Platform speech capability seams.
//!
//! Speech-to-text and text-to-speech are external collaborators. The
//! controller talks to them through these traits; platform adapters wrap
//! whatever the host OS or webview provides. The `Null*` implementations
//! stand in when the platform has no speech services (headless runs,
//! tests), in which case recognition reports itself unavailable and
//! synthesis is a no-op.

use crate::language::Language;
use async_trait::async_trait;

/// Single-shot speech recognition.
///
/// One `listen` call is one capture session: it resolves with the
/// recognized transcript, or `None` when recognition ends without a result
/// (silence, error, cancellation). Session exclusivity is enforced by the
/// controller, which only honors the most recently started session.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Whether the platform offers speech recognition at all.
    fn is_available(&self) -> bool;

    async fn listen(&self, language: Language) -> Option<String>;
}

/// Fire-and-forget speech synthesis with cancellation.
///
/// `speak` replaces any utterance in progress. The platform adapter reports
/// playback start and finish back through the session handle it was built
/// with; this trait only carries the outbound half.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, language: Language);

    fn cancel(&self);
}

/// Recognizer for platforms without speech input.
pub struct NullRecognizer;

#[async_trait]
impl SpeechRecognizer for NullRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    async fn listen(&self, _language: Language) -> Option<String> {
        None
    }
}

/// Synthesizer for platforms without speech output.
pub struct NullSynthesizer;

impl SpeechSynthesizer for NullSynthesizer {
    fn speak(&self, _text: &str, _language: Language) {}

    fn cancel(&self) {}
}
