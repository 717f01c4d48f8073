//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that an answer contains something other than whitespace.
///
/// # Examples
///
/// ```ignore
/// validate_answer_text("we did it")  // Ok
/// validate_answer_text("   ")        // Err - blank
/// ```
pub fn validate_answer_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("answer_blank");
        err.message = Some("Answer must not be blank".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_answer_text_valid() {
        assert!(validate_answer_text("a").is_ok());
        assert!(validate_answer_text("  padded answer ").is_ok());
    }

    #[test]
    fn test_validate_answer_text_blank() {
        assert!(validate_answer_text("").is_err());
        assert!(validate_answer_text(" \t\n").is_err());
    }
}
