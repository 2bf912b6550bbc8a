//! The phone validity rule shared by the manual list and the spreadsheet import.

/// Longest digit string a recipient line may hold.
pub const MAX_PHONE_DIGITS: usize = 11;

const MOBILE_PREFIX: &str = "01";
const MOBILE_010_PREFIX: &str = "010";

/// Which part of the phone rule a digit string breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneRuleViolation {
    /// Does not start with `01`.
    MissingPrefix,
    /// Starts with `010` but is not exactly 11 digits long.
    Length010,
    /// Starts with `01x` (x != 0) but is not 10 or 11 digits long.
    LengthOther,
}

/// Checks a hyphen-free digit string against the phone rule.
///
/// The prefix is checked first, then the length rule that applies to it.
pub fn check_phone(digits: &str) -> Result<(), PhoneRuleViolation> {
    if !digits.starts_with(MOBILE_PREFIX) {
        return Err(PhoneRuleViolation::MissingPrefix);
    }
    let len = digits.chars().count();
    if digits.starts_with(MOBILE_010_PREFIX) {
        if len != 11 {
            return Err(PhoneRuleViolation::Length010);
        }
    } else if !(10..=11).contains(&len) {
        return Err(PhoneRuleViolation::LengthOther);
    }
    Ok(())
}

pub fn is_valid_phone(digits: &str) -> bool {
    check_phone(digits).is_ok()
}

/// True when a line being completed with Enter would be a malformed `010` number.
pub(crate) fn is_incomplete_010(line: &str) -> bool {
    line.starts_with(MOBILE_010_PREFIX) && line.chars().count() != 11
}
