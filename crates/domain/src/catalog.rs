//! Product catalog types consumed by the cart and order flows.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::money::{Money, normalize_stock};

/// Product identifier (opaque document id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A customer review attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: UserId,
    /// Star rating, 1 to 5.
    pub rating: u8,
    pub comment: Option<String>,
    pub date: DateTime<Utc>,
}

impl Review {
    /// Creates a review, clamping the rating into the 1..=5 band.
    pub fn new(
        user_id: UserId,
        rating: u8,
        comment: Option<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            rating: rating.clamp(1, 5),
            comment,
            date,
        }
    }
}

/// A catalog product.
///
/// Read-only display data as far as the cart and order flows are
/// concerned; stock is advisory and never gates a sale. The rating is
/// derived from the review list and recomputed on every review write,
/// never trusted from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    /// Original list price, when the product is discounted.
    #[serde(default)]
    pub list_price: Option<Money>,
    pub category: String,
    pub image: String,
    pub stock: u32,
    /// Average of review ratings, 0.0 with no reviews.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Appends a review and recomputes the derived rating.
    pub fn add_review(&mut self, review: Review, now: DateTime<Utc>) {
        self.reviews.push(review);
        self.rating = average_rating(&self.reviews);
        self.updated_at = now;
    }

    /// Sets stock from a raw decimal value, flooring to a whole count.
    pub fn set_stock(&mut self, raw: f64) {
        self.stock = normalize_stock(raw);
    }
}

/// Average star rating across reviews, 0.0 when there are none.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| r.rating as u32).sum();
    sum as f64 / reviews.len() as f64
}
