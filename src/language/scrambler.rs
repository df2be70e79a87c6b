//! Deterministic word garbling for languages a listener does not know.
//!
//! Each word is replaced by a run of syllables from the target language. The
//! generator is seeded from the word itself, so the same word always garbles the same
//! way in the same language: listeners learn to recognise repeated phrases without
//! understanding them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::text::{capitalize_first, markup_len};
use crate::language::registry::Language;

/// Seed for a word: the sum of its character code values.
pub fn word_seed(word: &str) -> u64 {
    word.chars().map(|c| u64::from(u32::from(c))).sum()
}

/// Number of syllables a word of `len` characters garbles into.
fn syllable_count(len: usize, rng: &mut StdRng) -> usize {
    let len = len as f64;
    let spread = len / 4.0;
    let jitter = if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    };
    ((len / 2.0 + jitter).round() as i64).max(1) as usize
}

/// Garble a single word into syllables.
///
/// An empty syllable list leaves the word untouched; validation rejects such
/// languages, so this only matters for hand-built registries.
pub fn scramble_word(word: &str, syllables: &[String]) -> String {
    if word.is_empty() || syllables.is_empty() {
        return word.to_string();
    }

    let mut rng = StdRng::seed_from_u64(word_seed(word));
    let count = syllable_count(word.chars().count(), &mut rng);

    let mut out = String::with_capacity(count * 3);
    for _ in 0..count {
        out.push_str(&syllables[rng.gen_range(0..syllables.len())]);
    }

    if word.chars().next().is_some_and(char::is_uppercase) {
        capitalize_first(&out)
    } else {
        out
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Garble every word of `text` in `language`.
///
/// Non-word characters and whitespace pass through unchanged, as do markup tags
/// (`<...>`) and character entities (`&...;`) so rendered formatting survives.
pub fn scramble_text(text: &str, language: &Language) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut word = String::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if let Some(len) = markup_len(rest) {
            flush_word(&mut word, &mut out, &language.syllables);
            out.push_str(&rest[..len]);
            rest = &rest[len..];
            continue;
        }

        if is_word_char(c) {
            word.push(c);
        } else {
            flush_word(&mut word, &mut out, &language.syllables);
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    flush_word(&mut word, &mut out, &language.syllables);

    out
}

fn flush_word(word: &mut String, out: &mut String, syllables: &[String]) {
    if !word.is_empty() {
        out.push_str(&scramble_word(word, syllables));
        word.clear();
    }
}
