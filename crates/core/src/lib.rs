//! Scamazon Core - Shared domain types.
//!
//! This crate provides the types shared by every Scamazon component:
//! - `storefront` - Server-rendered storefront over the backend REST API
//! - `cli` - Command-line access to the same API
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain rules - no I/O, no HTTP
//! clients. The basket and address book invariants live here so that both the
//! state reducers and any test double of the backend enforce the same rules.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, prices, quantities, emails, basket, addresses,
//!   products, users and load statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
