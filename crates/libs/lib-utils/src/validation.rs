//! # Validation Utilities
//!
//! Input validation helpers.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field_name))
    } else {
        Ok(())
    }
}

/// Validate email format (basic check).
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.contains('@') && email.contains('.') {
        Ok(())
    } else {
        Err("Invalid email format".to_string())
    }
}

/// Validate minimum length.
pub fn validate_min_length(value: &str, min: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(format!("{} must be at least {} characters", field_name, min))
    } else {
        Ok(())
    }
}

/// Validate maximum length (in characters).
pub fn validate_max_length(value: &str, max: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("{} must be at most {} characters", field_name, max))
    } else {
        Ok(())
    }
}
