//! Checkout submission payload and boundary validation.

use common::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ProductId;
use crate::money::Money;

use super::state::PaymentMethod;

/// Errors reported when a checkout submission fails validation.
///
/// Validation runs once at the boundary and reports the first failure;
/// nothing is persisted on any of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// The email address has no plausible shape.
    #[error("invalid email address: {email}")]
    InvalidEmail { email: String },

    /// The submission carries no lines.
    #[error("order contains no items")]
    NoLines,

    /// A line quantity below 1.
    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: u32 },

    /// A line priced below zero.
    #[error("negative price for product {product_id}")]
    NegativePrice { product_id: String },
}

/// Structured shipping address. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("postal code", &self.postal_code),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField { field });
            }
        }
        if !is_plausible_email(&self.email) {
            return Err(ValidationError::InvalidEmail {
                email: self.email.clone(),
            });
        }
        Ok(())
    }
}

/// One submitted order line.
///
/// The unit price is a client-side snapshot; the order service re-sums
/// the lines itself and never trusts a submitted subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// Full checkout submission, validated once at the boundary into a
/// value the order service can consume without re-checking fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutInput {
    pub user_id: UserId,
    pub lines: Vec<CheckoutLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutInput {
    /// Validates the submission, reporting the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lines.is_empty() {
            return Err(ValidationError::NoLines);
        }
        for line in &self.lines {
            if line.name.trim().is_empty() {
                return Err(ValidationError::MissingField { field: "line name" });
            }
            if line.quantity < 1 {
                return Err(ValidationError::InvalidQuantity {
                    product_id: line.product_id.to_string(),
                    quantity: line.quantity,
                });
            }
            if line.unit_price.is_negative() {
                return Err(ValidationError::NegativePrice {
                    product_id: line.product_id.to_string(),
                });
            }
        }
        self.shipping_address.validate()
    }
}

/// Matches the storefront form check: something before the `@`, a dot
/// somewhere in the domain, no whitespace.
fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
