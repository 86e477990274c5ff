//! Input checks shared by the record forms.

use crate::errors::{Error, Result};

/// Trims `value` and checks it is non-empty and at most `max_len` characters.
pub(crate) fn required_text(field: &'static str, value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(Error::validation(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional value, turning blank input into `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Trims an optional form field in place, turning blank input into `None`.
pub(crate) fn tidy(value: &mut Option<String>) {
    *value = optional_text(value.as_deref());
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("name", "  Chai ", 40).unwrap(), "Chai");
    }

    #[test]
    fn test_required_text_rejects_blank_and_long() {
        assert!(required_text("name", "   ", 40).is_err());
        assert!(required_text("name", "abcdef", 5).is_err());
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some(" x ")), Some("x".to_string()));
    }

    #[test]
    fn test_tidy_clears_blank_fields() {
        let mut blank = Some(" \t".to_string());
        tidy(&mut blank);
        assert_eq!(blank, None);

        let mut padded = Some(" sales@alfki.de ".to_string());
        tidy(&mut padded);
        assert_eq!(padded.as_deref(), Some("sales@alfki.de"));
    }
}
