//! Field-level validation shared by every form.
//!
//! Form structs hold raw strings exactly as submitted. Their `validate`
//! methods build a [`FieldErrors`] with the helpers below and either return
//! a typed value ready for persistence or the collected errors, which the
//! handler renders back into the form.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// A single failed rule, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<ValidationError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(ValidationError::new(field, message));
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// All messages for `field`, space separated. Empty when the field is valid.
    pub fn message(&self, field: &str) -> String {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for FieldErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Trimmed, non-empty text no longer than `max_len` characters.
pub fn required_text(errors: &mut FieldErrors, field: &'static str, raw: &str, max_len: usize) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        check_max_len(errors, field, value, max_len);
    }
    value.to_string()
}

pub fn check_max_len(errors: &mut FieldErrors, field: &'static str, value: &str, max_len: usize) {
    let len = value.chars().count();
    if len > max_len {
        errors.add(
            field,
            format!("Ensure this value has at most {max_len} characters (it has {len})."),
        );
    }
}

pub fn parse_integer(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<i32> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    match value.parse::<i32>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, "Enter a whole number.");
            None
        }
    }
}

pub fn check_min(errors: &mut FieldErrors, field: &'static str, value: i32, min: i32) {
    if value < min {
        errors.add(field, format!("Ensure this value is greater than or equal to {min}."));
    }
}

/// Stock movement quantities must be positive integers.
pub fn positive_quantity(field: &'static str, quantity: i32) -> Result<i32, ValidationError> {
    if quantity > 0 {
        Ok(quantity)
    } else {
        Err(ValidationError::new(field, "Quantity must be a positive integer."))
    }
}

/// Rejects amounts with more than eight whole digits, the `NUMERIC(10, 2)` limit.
pub fn amount_fits(field: &'static str, amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount.abs() < Decimal::new(100_000_000, 0) {
        Ok(amount)
    } else {
        Err(ValidationError::new(
            field,
            "Ensure that there are no more than 8 digits before the decimal point.",
        ))
    }
}

/// A `NUMERIC(10, 2)` amount: at most two decimal places and eight whole digits.
pub fn parse_amount(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<Decimal> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    let amount = match Decimal::from_str(value) {
        Ok(d) => d,
        Err(_) => {
            errors.add(field, "Enter a number.");
            return None;
        }
    };
    let before = errors.len();
    if amount.scale() > 2 {
        errors.add(field, "Ensure that there are no more than 2 decimal places.");
    }
    if let Err(e) = amount_fits(field, amount) {
        errors.push(e);
    }
    if amount.is_sign_negative() && !amount.is_zero() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    }
    (errors.len() == before).then_some(amount)
}

/// A select box referencing another row. Blank means "none".
pub fn parse_reference(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    required: bool,
) -> Option<i64> {
    let value = raw.trim();
    if value.is_empty() {
        if required {
            errors.add(field, REQUIRED);
        }
        return None;
    }
    match value.parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

pub fn parse_choice<T: FromStr>(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<T> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    match value.parse::<T>() {
        Ok(choice) => Some(choice),
        Err(_) => {
            errors.add(field, format!("Select a valid choice. {value} is not one of the available choices."));
            None
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("email pattern compiles")
    })
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && email_regex().is_match(value)
}

pub fn required_email(errors: &mut FieldErrors, field: &'static str, raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if !is_valid_email(value) {
        errors.add(field, "Enter a valid email address.");
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_quantity_rejects_zero_and_negative() {
        let zero = positive_quantity("quantity", 0).unwrap_err();
        assert_eq!(zero.field, "quantity");
        assert!(positive_quantity("quantity", -3).is_err());
        assert_eq!(positive_quantity("quantity", 1), Ok(1));
    }

    #[test]
    fn required_text_trims_and_checks_length() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_text(&mut errors, "name", "  Widget ", 10), "Widget");
        assert!(errors.is_empty());

        required_text(&mut errors, "name", "   ", 10);
        required_text(&mut errors, "address", "abcdefghijk", 10);
        assert_eq!(errors.message("name"), REQUIRED);
        assert_eq!(
            errors.message("address"),
            "Ensure this value has at most 10 characters (it has 11)."
        );
    }

    #[test]
    fn integers_must_parse() {
        let mut errors = FieldErrors::new();
        assert_eq!(parse_integer(&mut errors, "quantity", " 42 "), Some(42));
        assert_eq!(parse_integer(&mut errors, "quantity", "4.5"), None);
        assert_eq!(errors.message("quantity"), "Enter a whole number.");
    }

    #[test]
    fn amounts_allow_two_decimal_places() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            parse_amount(&mut errors, "price", "19.99"),
            Some(Decimal::new(1999, 2))
        );
        assert_eq!(parse_amount(&mut errors, "price", "0"), Some(Decimal::ZERO));
        assert!(errors.is_empty());

        assert_eq!(parse_amount(&mut errors, "price", "1.999"), None);
        assert!(errors.message("price").contains("2 decimal places"));
    }

    #[test]
    fn amounts_reject_negative_and_oversized_values() {
        let mut errors = FieldErrors::new();
        assert_eq!(parse_amount(&mut errors, "price", "-0.01"), None);
        assert!(errors.message("price").contains("greater than or equal to 0"));

        let mut errors = FieldErrors::new();
        assert_eq!(parse_amount(&mut errors, "total_price", "123456789"), None);
        assert!(errors.message("total_price").contains("8 digits"));

        let mut errors = FieldErrors::new();
        assert_eq!(parse_amount(&mut errors, "price", "ten"), None);
        assert_eq!(errors.message("price"), "Enter a number.");
    }

    #[test]
    fn references_distinguish_blank_from_invalid() {
        let mut errors = FieldErrors::new();
        assert_eq!(parse_reference(&mut errors, "supplier", "", false), None);
        assert!(errors.is_empty());

        assert_eq!(parse_reference(&mut errors, "category", "", true), None);
        assert_eq!(errors.message("category"), REQUIRED);

        assert_eq!(parse_reference(&mut errors, "product", "abc", true), None);
        assert_eq!(errors.message("product"), INVALID_CHOICE);

        assert_eq!(parse_reference(&mut errors, "product", "7", true), Some(7));
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("orders@acme.example"));
        assert!(is_valid_email("first.last+tag@sub.acme.io"));
        assert!(!is_valid_email("acme.example"));
        assert!(!is_valid_email("orders@localhost"));
        assert!(!is_valid_email("two@@acme.io"));
        assert!(!is_valid_email("space in@acme.io"));
    }

    #[test]
    fn finish_returns_value_only_without_errors() {
        assert_eq!(FieldErrors::new().finish(|| 5), Ok(5));

        let mut errors = FieldErrors::new();
        errors.add(NON_FIELD, "Something went wrong.");
        let err = errors.finish(|| 5).unwrap_err();
        assert!(err.has(NON_FIELD));
        assert!(!err.has("name"));
    }
}
