//! Common validation utilities.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum accepted client weight in kilograms.
pub const MAX_WEIGHT_KG: f64 = 500.0;

/// Maximum accepted client height in meters.
pub const MAX_HEIGHT_M: f64 = 3.0;

lazy_static! {
    /// Usernames: 3-50 chars, letters, digits, dot, underscore, dash.
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9._-]{3,50}$").unwrap();

    /// Phone numbers: optional +, 6-20 digits, spaces and dashes allowed.
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{4,18}[0-9]$").unwrap();
}

/// Validates a username against the allowed character set.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_format");
        err.message =
            Some("Username must be 3-50 characters: letters, digits, '.', '_' or '-'".into());
        Err(err)
    }
}

/// Validates a phone number in loose international format.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone number format is invalid".into());
        Err(err)
    }
}

/// Validates that a client weight is within (0, 500] kg.
pub fn validate_weight(weight: f64) -> Result<(), ValidationError> {
    if weight > 0.0 && weight <= MAX_WEIGHT_KG {
        Ok(())
    } else {
        let mut err = ValidationError::new("weight_range");
        err.message = Some("Weight must be greater than 0 and at most 500 kg".into());
        Err(err)
    }
}

/// Validates that a client height is within (0, 3.0] m.
pub fn validate_height(height: f64) -> Result<(), ValidationError> {
    if height > 0.0 && height <= MAX_HEIGHT_M {
        Ok(())
    } else {
        let mut err = ValidationError::new("height_range");
        err.message = Some("Height must be greater than 0 and at most 3.0 m".into());
        Err(err)
    }
}

/// Validates that a discount percentage is within (0, 100].
pub fn validate_discount(discount: f64) -> Result<(), ValidationError> {
    if discount > 0.0 && discount <= 100.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("discount_range");
        err.message = Some("Discount must be greater than 0 and at most 100 percent".into());
        Err(err)
    }
}

/// Validates that a monetary amount is strictly positive.
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if amount > 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("amount_range");
        err.message = Some("Amount must be greater than 0".into());
        Err(err)
    }
}

/// Validates that a date range is ordered (start strictly before end).
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start < end {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_range");
        err.message = Some("Start date must be before end date".into());
        Err(err)
    }
}

/// Validates password strength: at least 8 chars, one uppercase, one
/// lowercase, one digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.len() >= 8;
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_upper && has_lower && has_digit {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message = Some(
            "Password must be at least 8 characters with one uppercase letter, one lowercase letter and one digit"
                .into(),
        );
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("carlos.mendoza").is_ok());
        assert!(validate_username("admin_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+591 2-1234567").is_ok());
        assert!(validate_phone("71234567").is_ok());
        assert!(validate_phone("abc").is_err());
        assert!(validate_phone("1").is_err());
    }

    #[test]
    fn test_validate_weight_bounds() {
        assert!(validate_weight(80.0).is_ok());
        assert!(validate_weight(500.0).is_ok());
        assert!(validate_weight(600.0).is_err());
        assert!(validate_weight(0.0).is_err());
        assert!(validate_weight(-1.0).is_err());
    }

    #[test]
    fn test_validate_height_bounds() {
        assert!(validate_height(1.75).is_ok());
        assert!(validate_height(3.0).is_ok());
        assert!(validate_height(3.1).is_err());
        assert!(validate_height(0.0).is_err());
    }

    #[test]
    fn test_validate_discount_bounds() {
        assert!(validate_discount(15.0).is_ok());
        assert!(validate_discount(100.0).is_ok());
        assert!(validate_discount(0.0).is_err());
        assert!(validate_discount(101.0).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(150.0).is_ok());
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-10.0).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(validate_date_range(start, end).is_ok());
        assert!(validate_date_range(end, start).is_err());
        assert!(validate_date_range(start, start).is_err());
    }

    #[test]
    fn test_validate_password_strength() {
        assert!(validate_password_strength("Abcdef12").is_ok());
        assert!(validate_password_strength("short1A").is_err());
        assert!(validate_password_strength("alllowercase1").is_err());
        assert!(validate_password_strength("ALLUPPERCASE1").is_err());
        assert!(validate_password_strength("NoDigitsHere").is_err());
    }
}
