//! Instruction strings sent to the generative-text provider.

use crate::fallback::EnhancementKind;

/// Prompt for an enhancement of `kind`.
pub fn enhance(kind: EnhancementKind, text: &str) -> String {
    match kind {
        EnhancementKind::Structure => format!(
            "Fix punctuation, capitalization, and grammar in this text. Keep it concise:\n\n{text}"
        ),
        EnhancementKind::Expressions => {
            format!("Add appropriate emotions and tone to this text. Keep it natural:\n\n{text}")
        }
        EnhancementKind::Readability => {
            format!("Improve punctuation and readability:\n\n{text}")
        }
    }
}

/// Prompt for a translation into `target_language`.
pub fn translate(target_language: &str, text: &str) -> String {
    format!(
        "Translate the following text to {target_language}. Maintain the original meaning and tone. \
         Only return the translation, no additional commentary:\n\n{text}"
    )
}

/// Prompt for a short summary.
pub fn summarize(text: &str) -> String {
    format!("Summarize this text in 2-3 sentences, highlighting key points:\n\n{text}")
}
