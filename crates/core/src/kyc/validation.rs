//! Local PAN and Aadhaar format checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Five letters, four digits, one letter.
    static ref PAN_REGEX: Regex =
        Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]{1}$").expect("Invalid regex pattern");

    /// Exactly twelve ASCII digits. `\d` would also admit other scripts' digits.
    static ref AADHAAR_REGEX: Regex =
        Regex::new(r"^[0-9]{12}$").expect("Invalid regex pattern");
}

/// Trims and upper-cases a PAN. Only ASCII letters change case.
pub fn normalize_pan(pan: &str) -> String {
    pan.trim().to_ascii_uppercase()
}

/// Drops all whitespace, so `1234 5678 9012` is accepted.
pub fn normalize_aadhaar(number: &str) -> String {
    number.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn is_valid_pan_format(pan: &str) -> bool {
    PAN_REGEX.is_match(&normalize_pan(pan))
}

pub fn is_valid_aadhaar_format(number: &str) -> bool {
    AADHAAR_REGEX.is_match(&normalize_aadhaar(number))
}
