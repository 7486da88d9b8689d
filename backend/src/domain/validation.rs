//! Input validation shared by the domain services.

use chrono::{NaiveDate, NaiveTime};

use crate::domain::error::{DomainError, DomainResult};

pub const MAX_NAME_LEN: usize = 100;
/// Ceiling for any single money input: 100 million in currency units
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

/// Check a money amount lies in `min..=MAX_AMOUNT_CENTS`
pub fn amount_cents(field: &str, value: i64, min: i64) -> DomainResult<i64> {
    if value < min {
        return Err(DomainError::validation(if min > 0 {
            format!("{} must be greater than zero", field)
        } else {
            format!("{} cannot be negative", field)
        }));
    }
    if value > MAX_AMOUNT_CENTS {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} cents",
            field, MAX_AMOUNT_CENTS
        )));
    }
    Ok(value)
}

/// Trim a required free-text field and enforce its length
pub fn required_text(field: &str, value: &str, max_len: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }
    Ok(trimmed.to_string())
}

/// Lowercase and check an email address has a local part and a dotted domain
pub fn normalize_email(value: &str) -> DomainResult<String> {
    let email = value.trim().to_lowercase();
    let invalid = || DomainError::validation(format!("Invalid email address: {}", value.trim()));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(email)
}

/// Strip formatting from a phone number and require 7-20 digits
pub fn normalize_phone(value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' => {}
            _ => return Err(DomainError::validation(format!("Invalid phone number: {}", trimmed))),
        }
    }

    if !(7..=20).contains(&digits.len()) {
        return Err(DomainError::validation("Phone number must have between 7 and 20 digits"));
    }
    Ok(format!("{}{}", prefix, digits))
}

/// Uppercase a plate and drop spaces and dashes; 2-10 alphanumerics remain
pub fn normalize_plate(value: &str) -> DomainResult<String> {
    let plate: String = value
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if !(2..=10).contains(&plate.len()) || !plate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::validation(format!("Invalid plate number: {}", value.trim())));
    }
    Ok(plate)
}

pub fn parse_date(field: &str, value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("{} must be in YYYY-MM-DD format", field)))
}

pub fn parse_time(field: &str, value: &str) -> DomainResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| DomainError::validation(format!("{} must be in HH:MM format", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_cents_bounds() {
        assert_eq!(amount_cents("Rate", 0, 0).unwrap(), 0);
        assert_eq!(amount_cents("Rate", MAX_AMOUNT_CENTS, 0).unwrap(), MAX_AMOUNT_CENTS);
        assert!(amount_cents("Rate", -1, 0).is_err());
        assert!(amount_cents("Payment", 0, 1).is_err());
        assert!(amount_cents("Payment", MAX_AMOUNT_CENTS + 1, 1).is_err());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("Name", "  Ana  ", 10).unwrap(), "Ana");
        assert!(required_text("Name", "   ", 10).is_err());
        assert!(required_text("Name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn test_email_validation() {
        assert_eq!(normalize_email(" Ana@Example.COM ").unwrap(), "ana@example.com");
        for bad in ["", "ana", "@example.com", "ana@", "ana@example", "ana@@example.com", "a na@example.com", "ana@example..com"] {
            assert!(normalize_email(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(normalize_phone("(555) 123-4567").unwrap(), "5551234567");
        assert_eq!(normalize_phone("+63 917 555 0000").unwrap(), "+639175550000");
        assert!(normalize_phone("12345").is_err());
        assert!(normalize_phone("555-CALL-NOW").is_err());
    }

    #[test]
    fn test_plate_normalization() {
        assert_eq!(normalize_plate("abc-123").unwrap(), "ABC123");
        assert_eq!(normalize_plate("ABC 123").unwrap(), "ABC123");
        assert!(normalize_plate("A").is_err());
        assert!(normalize_plate("AB#123").is_err());
        assert!(normalize_plate("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn test_date_and_time_parsing() {
        assert_eq!(parse_date("Date", "2025-02-28").unwrap(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert!(parse_date("Date", "2025-02-30").is_err());
        assert_eq!(parse_time("Start", "09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_time("Start", "25:00").is_err());
    }
}
