//! Validation helpers for DTOs.

use validator::ValidationError;

/// Highest position a question may take inside its round.
pub const MAX_QUESTION_ORDER: u8 = 10;

/// Longest canonical answer, and longest submitted answer, in characters.
pub const MAX_ANSWER_CHARS: u64 = 500;

/// Validates that a free-text field still has content once surrounding whitespace is removed.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Quiz night") // Ok
/// validate_not_blank("   ")        // Err - blank
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a question position lies within `1..=MAX_QUESTION_ORDER`.
pub fn validate_question_order(order: u8) -> Result<(), ValidationError> {
    if !(1..=MAX_QUESTION_ORDER).contains(&order) {
        let mut err = ValidationError::new("question_order_range");
        err.message = Some(
            format!("Question order must be between 1 and {MAX_QUESTION_ORDER} (got {order})")
                .into(),
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Quiz night").is_ok());
        assert!(validate_not_blank(" a ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t\n").is_err());
    }

    #[test]
    fn test_validate_question_order() {
        assert!(validate_question_order(1).is_ok());
        assert!(validate_question_order(10).is_ok());
        assert!(validate_question_order(0).is_err());
        assert!(validate_question_order(11).is_err());
    }
}
