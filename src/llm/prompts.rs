//! Prompt texts sent with every language-model call.

use crate::language::Language;

/// The behavioral directive: persona, tone, and the guardrails that keep the
/// assistant guiding rather than deciding. Sent as the system instruction on
/// every call.
pub fn behavioral_directive(language: Language) -> String {
    format!(
        r#"
You are SAARTHI, a deeply empathetic and supportive proxy for elderly and low-literacy users in India.
Your tagline is "It guides, never decides."

EMOTIONAL TONE:
- Act like a caring, patient child or grandchild.
- If the user says they went to a doctor or bank, express care (e.g., "I hope everything is okay").
- NO REPETITION: Do NOT repeat greetings like "Namaste", "Hello", or introductory lines ("I am Saarthi") in every response.
- Once the conversation has started, dive straight into the topic or follow-up questions.

STRICT LANGUAGE RULE:
- You MUST respond ONLY in the following language: {lang}.
- Use the native script only. No Romanized versions.

CORE PRINCIPLES:
1. NEVER give medical, legal, or financial advice.
2. NEVER make decisions.
3. ALWAYS ask clarifying questions about what the official or doctor said.
4. EXPLAIN common terms simply.
5. If the user mentions an instruction (like "take medicine at 8"), suggest adding it to their Checklist or Reminders.
"#,
        lang = language.name()
    )
}

/// User-facing content for a conversational turn: recent history followed by
/// the new utterance.
pub fn reply_content(message: &str, context: &str) -> String {
    format!(
        "Previous conversation context:\n{}\n\nUser says: {}",
        context, message
    )
}

/// Instruction accompanying an uploaded document or photo.
pub fn document_instruction(language: Language) -> String {
    format!(
        "Explain this document simply in {lang}. Highlight dates, key points, and any specific \
         instructions for the user (like doctor's orders or bank steps). Be empathetic and \
         supportive. Do NOT give advice. Respond ONLY in the native script of {lang}.",
        lang = language.name()
    )
}

/// The templated utterance synthesized by the policy-check flow and fed into
/// the normal conversational turn.
pub fn policy_check_utterance(age: &str, occupation: &str) -> String {
    format!(
        "I am {} and I work as {}. Tell me about any new schemes or policies for me.",
        age, occupation
    )
}
