//! Cart and order domain for the storefront engine.
//!
//! This crate provides the business rules that turn a cart of line items
//! into a priced, validated, persisted order:
//! - Money and quantity normalization utilities
//! - The session cart aggregate with derived totals
//! - The order aggregate with its status machine and order numbers
//! - Checkout validation at the submission boundary
//! - Storage ports implemented by the `storage` crate

pub mod cart;
pub mod catalog;
pub mod money;
pub mod order;
pub mod pricing;
pub mod store;
pub mod wishlist;

pub use cart::{Cart, CartLine, CartSession, KeyValueStore};
pub use catalog::{Product, ProductId, Review};
pub use money::Money;
pub use order::{
    CheckoutInput, CheckoutLine, Order, OrderError, OrderLine, OrderNumber, OrderService,
    OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress, ValidationError,
};
pub use pricing::Totals;
pub use store::{OrderStore, ProductStore, StorageError};
pub use wishlist::{Wishlist, WishlistError, WishlistItem, WishlistSession};
