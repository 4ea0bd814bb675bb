use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};

/// Validates a required text field (tag or description).
///
/// # Arguments
///
/// * `field` - The field name used in the error message.
/// * `value` - The value to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the value is valid.
pub fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }

    Ok(())
}

/// Validates the timing fields of a session.
///
/// `end` may not precede `start`, and `focused` must fit between zero and
/// the wall-clock span of the session.
pub fn validate_timing(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    focused: Option<i64>,
) -> Result<()> {
    if let Some(end) = end {
        if end < start {
            return Err(AppError::Validation(
                "end must not be earlier than start".to_string(),
            ));
        }
    }

    if let Some(focused) = focused {
        if focused < 0 {
            return Err(AppError::Validation(
                "focused must be non-negative".to_string(),
            ));
        }

        if let Some(end) = end {
            let span = (end - start).num_seconds();
            if focused > span {
                return Err(AppError::Validation(format!(
                    "focused ({}s) exceeds the session length ({}s)",
                    focused, span
                )));
            }
        }
    }

    Ok(())
}
