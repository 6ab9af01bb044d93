//! Custom validation functions for configuration.
//!
//! Shared validation logic used across the configuration modules.

use validator::ValidationError;

/// Validate that a given value is a power of two.
pub fn validate_power_of_two(value: usize) -> Result<(), ValidationError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_power_of_two"))
    }
}

/// Validate a recipient list: each entry must be an E.164 number with an
/// optional `whatsapp:` prefix. Empty lists are allowed here; an enabled
/// channel with no recipients is handled at session startup, not as a
/// parse failure.
pub fn validate_recipients(recipients: &[String]) -> Result<(), ValidationError> {
    let re = regex::Regex::new(r"^(whatsapp:)?\+[1-9][0-9]{6,14}$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;

    if recipients.iter().all(|r| re.is_match(r.trim())) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_recipient"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_whatsapp_numbers() {
        let recipients = vec![
            "+6281234567890".to_string(),
            "whatsapp:+6281234567890".to_string(),
        ];
        assert!(validate_recipients(&recipients).is_ok());
    }

    #[test]
    fn rejects_unprefixed_local_numbers() {
        let recipients = vec!["081234567890".to_string()];
        assert!(validate_recipients(&recipients).is_err());
    }

    #[test]
    fn power_of_two_check() {
        assert!(validate_power_of_two(1024).is_ok());
        assert!(validate_power_of_two(1000).is_err());
    }
}
