use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Decodes the HTML entities the API escapes inside titles and bodies.
/// Unknown named entities are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => numeric_entity(entity),
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Reduces text to the displayable set: printable ASCII, space and newline.
///
/// Everything else is dropped, including accented letters and emoji. The
/// conversion is lossy and cannot be reversed; in exchange every remaining
/// character occupies exactly one terminal cell.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| is_displayable(*c)).collect()
}

pub fn is_displayable(c: char) -> bool {
    c.is_ascii_graphic() || c == ' ' || c == '\n'
}

/// Cuts a normalised line down to at most `width` cells.
pub fn truncate(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
