//! Domain core: the cart container, money, and the checkout handoff.

pub mod cart;
pub mod checkout;
pub mod value_objects;

pub use cart::{Cart, CartLine};
pub use value_objects::{Money, Slug};
