use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Digits plus the separators people actually type into phone fields.
pub static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9+\-\s()]+$").unwrap());

pub fn validate_birth_year(year: i32) -> Result<(), ValidationError> {
    let current = Utc::now().year();
    if (1950..=current).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::new("birth_year"))
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_shape_accepts_separators() {
        assert!(PHONE_RE.is_match("0912345678"));
        assert!(PHONE_RE.is_match("+84 (91) 234-5678"));
        assert!(!PHONE_RE.is_match("0912abc678"));
        assert!(!PHONE_RE.is_match(""));
    }

    #[test]
    fn birth_year_bounds() {
        assert!(validate_birth_year(1950).is_ok());
        assert!(validate_birth_year(Utc::now().year()).is_ok());
        assert!(validate_birth_year(1949).is_err());
        assert!(validate_birth_year(Utc::now().year() + 1).is_err());
    }

    #[test]
    fn blank_content_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
        assert!(validate_not_blank("called, call back Monday").is_ok());
    }
}
