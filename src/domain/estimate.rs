// Estimate input validation
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Digits with at most one decimal point, or nothing at all.
static DECIMAL_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d*$").expect("decimal input pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both values")]
    MissingField,
    #[error("Please enter valid numbers")]
    NotANumber,
}

/// Keystroke filter applied by the front end before a raw value is accepted
/// into a form field.
pub fn is_acceptable_input(value: &str) -> bool {
    value.is_empty() || DECIMAL_INPUT.is_match(value)
}

/// Parses a (maps, ev) pair of raw field values into miles.
pub fn parse_estimates(maps_input: &str, ev_input: &str) -> Result<(f64, f64), ValidationError> {
    if maps_input.is_empty() || ev_input.is_empty() {
        return Err(ValidationError::MissingField);
    }

    Ok((parse_miles(maps_input)?, parse_miles(ev_input)?))
}

fn parse_miles(input: &str) -> Result<f64, ValidationError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(ValidationError::NotANumber)
}
