//! IT Solutions Core - Shared types library.
//!
//! This crate provides the types used across the IT Solutions components:
//! - `storefront` - Customer site and admin dashboard
//! - `cli` - Command-line tools for session migrations and backend queries
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Backend entities, ids, prices and branding validation
//! - [`cart`] - The shopping cart reducer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartItem};
pub use types::*;
