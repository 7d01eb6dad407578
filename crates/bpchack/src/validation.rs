//! Input validation the edge performs before delegating to the driver. The
//! driver trusts these shapes.

use masking::{PeekInterface, Secret};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid value provided for field: {field_name}")]
    InvalidValue { field_name: &'static str },
}

#[allow(clippy::expect_used)]
static APPLICATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{3,16}$").expect("application regex"));

#[allow(clippy::expect_used)]
static IDENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{3,64}$").expect("identity regex"));

#[allow(clippy::expect_used)]
static CARD_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{16}$").expect("card number regex"));

#[allow(clippy::expect_used)]
static CARD_EXPIRY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("card expiry regex"));

#[allow(clippy::expect_used)]
static CARD_CVC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}$").expect("card cvc regex"));

pub fn validate_application_and_identity(
    application: &str,
    identity: &str,
) -> Result<(), ValidationError> {
    if !APPLICATION_REGEX.is_match(application) {
        return Err(ValidationError::InvalidValue {
            field_name: "app",
        });
    }
    if !IDENTITY_REGEX.is_match(identity) {
        return Err(ValidationError::InvalidValue { field_name: "id" });
    }
    Ok(())
}

pub fn validate_card_details(
    card_number: &Secret<String>,
    card_expiry: &Secret<String>,
    name_on_card: &str,
    cvc_code: Option<&Secret<String>>,
) -> Result<(), ValidationError> {
    if !CARD_NUMBER_REGEX.is_match(card_number.peek()) {
        return Err(ValidationError::InvalidValue {
            field_name: "card-number",
        });
    }
    if !CARD_EXPIRY_REGEX.is_match(card_expiry.peek()) {
        return Err(ValidationError::InvalidValue {
            field_name: "card-expiry",
        });
    }
    let name_length = name_on_card.chars().count();
    if !(4..=32).contains(&name_length) {
        return Err(ValidationError::InvalidValue {
            field_name: "name-on-card",
        });
    }
    if let Some(cvc) = cvc_code {
        if !CARD_CVC_REGEX.is_match(cvc.peek()) {
            return Err(ValidationError::InvalidValue {
                field_name: "card-cvc",
            });
        }
    }
    Ok(())
}
