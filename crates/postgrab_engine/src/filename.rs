pub(crate) const MAX_FILENAME_BYTES: usize = 255;
const MAX_EXTENSION_BYTES: usize = 10;

/// Windows-safe file or directory name.
///
/// Forbidden characters become `_`, leading/trailing dots and spaces are
/// trimmed, empty names become `Untitled` and the result fits in 255 bytes.
/// Long names lose the end of their stem, never their extension.
pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut name = cleaned.trim_matches(&['.', ' '][..]).to_string();
    if name.is_empty() {
        name = "Untitled".to_string();
    }
    if name.len() > MAX_FILENAME_BYTES {
        let (stem, extension) = split_extension(&name);
        let budget = MAX_FILENAME_BYTES - extension.len();
        name = format!("{}{}", truncate_on_char_boundary(stem, budget), extension);
    }
    let stem_len = name.split('.').next().map_or(0, str::len);
    if is_reserved_windows_name(&name[..stem_len]) {
        name.insert(stem_len, '_');
    }
    name
}

/// Longest prefix of `text` that fits in `max_bytes` without splitting a character.
pub(crate) fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// `("name", ".ext")` for short alphanumeric extensions, `(name, "")` otherwise.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot)
            if dot > 0
                && (2..=MAX_EXTENSION_BYTES + 1).contains(&(name.len() - dot))
                && name[dot + 1..].chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            name.split_at(dot)
        }
        _ => (name, ""),
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
