//! Session shopping cart and its persistence port.

mod cart;
mod session;

pub use cart::{Cart, CartLine};
pub use session::{CartSession, KeyValueStore};
