//! Small text helpers shared by the transformers.

/// Punctuation as far as capitalization, punctuation and masking are concerned.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '…' | '—' | '–' | '¿' | '¡' | '«' | '»' | '“' | '”' | '‘' | '’'
        )
}

/// Replace literal angle brackets so user text cannot inject markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Byte length of a markup tag or entity starting at the beginning of `s`, if any.
pub fn markup_len(s: &str) -> Option<usize> {
    let first = s.chars().next()?;
    match first {
        '<' => {
            let end = s.find('>')?;
            let inner = &s[1..end];
            let looks_like_tag = inner
                .trim_start_matches('/')
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic());
            looks_like_tag.then_some(end + 1)
        }
        '&' => {
            let end = s.find(';')?;
            let name = &s[1..end];
            let is_entity = !name.is_empty()
                && name.len() <= 8
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#');
            is_entity.then_some(end + 1)
        }
        _ => None,
    }
}

/// Uppercase the first character of `s`.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
