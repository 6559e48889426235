//! Storefront - multi-tenant e-commerce backend
//!
//! Users register as buyers or shop owners, shops list products, admins
//! manage couriers, and buyers place orders that decrement stock atomically.
//!
//! # Modules
//!
//! - [`account`] - Users, roles, registration and login
//! - [`shop`] / [`product`] / [`courier`] - Catalogue entities
//! - [`order`] - Order placement, status FSMs and visibility
//! - [`store`] - Repository bundles (PostgreSQL or in-memory)
//! - [`gateway`] - Axum router, middleware and OpenAPI docs
//! - [`events`] - Domain event channel and cache worker

pub mod core_types;
pub mod error;

pub mod config;
pub mod logging;

pub mod auth;
pub mod db;
pub mod events;
pub mod store;

pub mod account;
pub mod courier;
pub mod order;
pub mod product;
pub mod shop;

pub mod gateway;

#[cfg(test)]
pub mod testing;

pub use error::{AppError, AppResult};
