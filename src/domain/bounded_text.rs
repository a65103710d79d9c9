use unicode_segmentation::UnicodeSegmentation;

/// Trims `s` and checks its length in graphemes against `min..=max`.
pub(super) fn parse_bounded(field: &str, s: &str, min: usize, max: usize) -> Result<String, String> {
    let trimmed = s.trim();
    let length = trimmed.graphemes(true).count();

    match length {
        0 => Err(format!("{field} is required")),
        _ if length < min => Err(format!("{field} must be at least {min} characters long")),
        _ if length > max => Err(format!("{field} must be at most {max} characters long")),
        _ => Ok(trimmed.to_string()),
    }
}
