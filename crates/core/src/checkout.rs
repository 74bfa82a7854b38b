//! Checkout form: payment details and shipping address.
//!
//! Card data is only checked for shape. Nothing is charged and the card
//! number never leaves the request that submitted it: after validation only
//! the last four digits are kept.

use serde::{Deserialize, Serialize};

use crate::validation::{ValidationErrors, require};

const CARD_NUMBER_DIGITS: usize = 16;
const CVV_DIGITS: usize = 3;

/// Card details as typed into the payment form.
///
/// Implements `Debug` manually to redact the card number and CVV.
#[derive(Clone, Default, Deserialize)]
pub struct PaymentDetails {
    #[serde(default)]
    pub card_holder: String,
    #[serde(default)]
    pub card_number: String,
    /// `MM/YY`.
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
}

impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_holder", &self.card_holder)
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// Shipping address captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

impl ShippingAddress {
    fn trimmed(&self) -> Self {
        Self {
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            country: self.country.trim().to_string(),
        }
    }

    /// One-line rendering for order summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip_code.as_str(),
            self.country.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// The whole checkout form as posted by the payment view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(flatten)]
    pub payment: PaymentDetails,
    #[serde(flatten)]
    pub shipping: ShippingAddress,
}

/// A checkout form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub card_holder: String,
    pub card_last4: String,
    pub shipping: ShippingAddress,
}

impl CheckoutForm {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns one message per failing field.
    pub fn validate(&self) -> Result<ValidatedCheckout, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let payment = &self.payment;

        require(&mut errors, "card_holder", &payment.card_holder, "Cardholder name");

        let digits = card_digits(&payment.card_number);
        if digits.is_empty() {
            errors.add("card_number", "Card number is required");
        } else if digits.len() != CARD_NUMBER_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
            errors.add("card_number", "Card number must be 16 digits");
        }

        if payment.expiry_date.trim().is_empty() {
            errors.add("expiry_date", "Expiry date is required");
        } else if parse_expiry(&payment.expiry_date).is_none() {
            errors.add("expiry_date", "Expiry date must be MM/YY");
        }

        let cvv = payment.cvv.trim();
        if cvv.is_empty() {
            errors.add("cvv", "CVV is required");
        } else if cvv.len() != CVV_DIGITS || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.add("cvv", "CVV must be 3 digits");
        }

        let shipping = &self.shipping;
        require(&mut errors, "street", &shipping.street, "Street");
        require(&mut errors, "city", &shipping.city, "City");
        require(&mut errors, "state", &shipping.state, "State");
        require(&mut errors, "zip_code", &shipping.zip_code, "ZIP code");
        require(&mut errors, "country", &shipping.country, "Country");

        let card_last4 = digits
            .get(digits.len().saturating_sub(4)..)
            .unwrap_or_default()
            .to_string();

        errors.finish(ValidatedCheckout {
            card_holder: payment.card_holder.trim().to_string(),
            card_last4,
            shipping: shipping.trimmed(),
        })
    }
}

/// Card number with spaces and dashes removed.
fn card_digits(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, ' ' | '-')).collect()
}

/// Parse `MM/YY` into `(month, year)`.
fn parse_expiry(raw: &str) -> Option<(u8, u8)> {
    let (month, year) = raw.trim().split_once('/')?;
    if month.len() != 2 || year.len() != 2 {
        return None;
    }
    let month: u8 = month.parse().ok()?;
    let year: u8 = year.parse().ok()?;
    (1..=12).contains(&month).then_some((month, year))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub fn valid_form() -> CheckoutForm {
        CheckoutForm {
            payment: PaymentDetails {
                card_holder: "John Smith".to_string(),
                card_number: "4242 4242 4242 4242".to_string(),
                expiry_date: "12/28".to_string(),
                cvv: "123".to_string(),
            },
            shipping: ShippingAddress {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip_code: "62701".to_string(),
                country: "USA".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_form() {
        let checkout = valid_form().validate().unwrap();
        assert_eq!(checkout.card_holder, "John Smith");
        assert_eq!(checkout.card_last4, "4242");
        assert_eq!(checkout.shipping.city, "Springfield");
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = CheckoutForm::default().validate().unwrap_err();
        for field in [
            "card_holder",
            "card_number",
            "expiry_date",
            "cvv",
            "street",
            "city",
            "state",
            "zip_code",
            "country",
        ] {
            assert!(errors.field(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn test_card_number_shape() {
        let mut form = valid_form();
        form.payment.card_number = "4242-4242-4242-4242".to_string();
        assert!(form.validate().is_ok());

        form.payment.card_number = "4242 4242 4242".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("card_number"), Some("Card number must be 16 digits"));

        form.payment.card_number = "4242 4242 4242 424x".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_expiry_shape() {
        assert_eq!(parse_expiry("01/30"), Some((1, 30)));
        assert_eq!(parse_expiry("13/30"), None);
        assert_eq!(parse_expiry("00/30"), None);
        assert_eq!(parse_expiry("1/30"), None);
        assert_eq!(parse_expiry("0130"), None);
    }

    #[test]
    fn test_cvv_shape() {
        let mut form = valid_form();
        form.payment.cvv = "12a".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("cvv"), Some("CVV must be 3 digits"));
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn test_debug_redacts_card_data() {
        let debug = format!("{:?}", valid_form().payment);
        assert!(debug.contains("John Smith"));
        assert!(!debug.contains("4242"));
        assert!(!debug.contains("123"));
    }

    #[test]
    fn test_flattened_form_decoding() {
        let form: CheckoutForm = serde_json::from_value(serde_json::json!({
            "card_holder": "Jane",
            "card_number": "4242424242424242",
            "expiry_date": "05/29",
            "cvv": "999",
            "street": "2 Side St",
            "city": "Shelbyville",
            "state": "IL",
            "zip_code": "62565",
            "country": "USA"
        }))
        .unwrap();
        assert_eq!(form.payment.card_holder, "Jane");
        assert_eq!(form.shipping.zip_code, "62565");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_address_one_line() {
        let address = valid_form().shipping;
        assert_eq!(address.one_line(), "1 Main St, Springfield, IL, 62701, USA");
    }
}
