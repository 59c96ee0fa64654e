//! Input validation helpers
//!
//! Everything here runs before the print service is contacted.

use crate::error::{PrintError, PrintResult};

/// Label type / SKU length limit (the label shrinks text to fit, so this is a sanity bound)
pub const MAX_LABEL_TEXT_LEN: usize = 200;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;

/// Validate a trimmed label field.
///
/// `empty_message` is shown verbatim when the field is blank.
pub fn validate_label_text(value: &str, field: &str, empty_message: &str) -> PrintResult<()> {
    if value.trim().is_empty() {
        return Err(PrintError::invalid_request(empty_message));
    }
    let len = value.chars().count();
    if len > MAX_LABEL_TEXT_LEN {
        return Err(PrintError::invalid_request(format!(
            "{field} is too long ({len} chars, max {MAX_LABEL_TEXT_LEN})"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(PrintError::invalid_request(format!(
            "{field} must not contain control characters"
        )));
    }
    Ok(())
}

pub fn validate_quantity(quantity: u32) -> PrintResult<()> {
    if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        return Err(PrintError::invalid_request(format!(
            "Please enter a quantity between {MIN_QUANTITY} and {MAX_QUANTITY}"
        )));
    }
    Ok(())
}

/// Parse operator quantity input ("3", " 12 ").
///
/// Whole numbers outside the allowed range, however large, get the range message.
pub fn parse_quantity(input: &str) -> PrintResult<u32> {
    let input = input.trim();
    let digits = input.strip_prefix(['-', '+']).unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrintError::invalid_request("Please enter a valid quantity"));
    }

    // Anything that does not fit a u32 is out of range anyway
    let quantity = if input.starts_with('-') {
        0
    } else {
        digits.parse::<u32>().unwrap_or(u32::MAX)
    };
    validate_quantity(quantity)?;
    Ok(quantity)
}
