//! Products and their stock counters.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::{CreateProductRequest, NewProduct, Product, ProductPatch};
pub use repository::{PgProductRepository, ProductRepository};
pub use service::ProductService;
