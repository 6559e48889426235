//! Shops: one per shop-role user, owner of products.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::{CreateShopRequest, NewShop, Shop, ShopPatch};
pub use repository::{PgShopRepository, ShopRepository};
pub use service::ShopService;
