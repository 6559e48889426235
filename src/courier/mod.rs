//! Couriers: admin-managed carriers referenced by orders.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::{Courier, CourierPatch, CreateCourierRequest};
pub use repository::{CourierRepository, PgCourierRepository};
pub use service::CourierService;
