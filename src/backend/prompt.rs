//! Prompt templates.

use crate::transport::ChatMessage;

/// Single user message asking for a bare translation of `text` into `lang_out`.
///
/// Untranslatable input (codes, proper nouns, `{{1}}`-style placeholders) is
/// to be returned verbatim.
pub fn translation_prompt(lang_out: &str, text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "You are a professional,authentic machine translation engine.\n\n\
         ;; Treat next line as plain text input and translate it into {lang_out}, \
         output translation ONLY. If translation is unnecessary (e.g. proper nouns, \
         codes, {{{{1}}}}, etc. ), return the original text. NO explanations. NO notes. \
         Input:\n\n{text}"
    ))]
}

/// The template with empty input, registered as a cache-impact parameter so
/// that any wording change invalidates cached translations.
pub fn translation_template(lang_out: &str) -> String {
    translation_prompt(lang_out, "")
        .into_iter()
        .map(|m| m.content)
        .collect()
}
