//! In-fiction languages: registry, comprehension and scrambling.

pub mod registry;
pub mod scrambler;

pub use registry::{GrantRules, Language, LanguageRegistry, WildcardPattern};
pub use scrambler::{scramble_text, scramble_word};

use crate::common::types::PlayerProfile;

/// Render `text` spoken in `language` for one listener.
///
/// The speaker and listeners who know the language read it unchanged; everybody
/// else gets the scrambled form.
pub fn render_for(
    registry: &LanguageRegistry,
    language: &Language,
    text: &str,
    listener: &PlayerProfile,
    listener_is_speaker: bool,
) -> String {
    if listener_is_speaker || registry.knows(listener, language) {
        text.to_string()
    } else {
        scramble_text(text, language)
    }
}
