//! Supported languages and their localized onboarding strings.

use serde::{Deserialize, Serialize};

/// Languages the assistant can listen, speak, and reply in.
///
/// The serialized form is the BCP-47 code used by the platform speech
/// services, so the same value flows into recognition, synthesis, and
/// durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "hi-IN")]
    Hindi,
    #[serde(rename = "ta-IN")]
    Tamil,
    #[serde(rename = "te-IN")]
    Telugu,
    #[serde(rename = "mr-IN")]
    Marathi,
    #[serde(rename = "bn-IN")]
    Bengali,
}

impl Language {
    /// All supported languages, in picker order.
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Hindi,
        Language::Tamil,
        Language::Telugu,
        Language::Marathi,
        Language::Bengali,
    ];

    /// BCP-47 code used for speech services and storage.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Tamil => "ta-IN",
            Language::Telugu => "te-IN",
            Language::Marathi => "mr-IN",
            Language::Bengali => "bn-IN",
        }
    }

    /// English name, used when instructing the language model.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Marathi => "Marathi",
            Language::Bengali => "Bengali",
        }
    }

    /// Native-script name shown in the language picker.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "हिन्दी",
            Language::Tamil => "தமிழ்",
            Language::Telugu => "తెలుగు",
            Language::Marathi => "मराठी",
            Language::Bengali => "বাংলা",
        }
    }

    /// Onboarding greeting, spoken once when a language is first chosen.
    pub fn greeting(&self) -> &'static str {
        match self {
            Language::English => "Hello! Where have you come from today? How are you?",
            Language::Hindi => "नमस्ते! आज आप कहाँ से आए हैं? आप कैसे हैं?",
            Language::Tamil => {
                "வணக்கம்! இன்று எங்கிருந்து வருகிறீர்கள்? நீங்கள் எப்படி இருக்கிறீர்கள்?"
            }
            Language::Telugu => {
                "నమస్కారం! ఈ రోజు మీరు ఎక్కడి నుండి వచ్చారు? మీరు ఎలా ఉన్నారు?"
            }
            Language::Marathi => "नमस्कार! आज आपण कोठून आला आहात? आपण कसे आहात?",
            Language::Bengali => "নমস্কার! আজ আপনি কোথা থেকে এসেছেন? আপনি কেমন আছেন?",
        }
    }

    /// Parse a stored BCP-47 code back into a language.
    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL.iter().copied().find(|l| l.code() == code)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Hindi
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
