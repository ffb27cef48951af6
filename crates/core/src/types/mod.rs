//! Core types for Scamazon.
//!
//! This module provides type-safe wrappers and records for the storefront domain.

pub mod address;
pub mod basket;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;
pub mod status;
pub mod user;

pub use address::{Address, AddressBook, AddressInput};
pub use basket::{Basket, LineItem};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{DiscountPercentage, Price};
pub use product::{AvailabilityStatus, Dimensions, Product, Review};
pub use quantity::{Quantity, QuantityError};
pub use status::LoadStatus;
pub use user::User;
