//! User accounts: registration, login and profile management.

pub mod cache;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use cache::UserCache;
pub use models::{
    AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User, UserPatch, UserView,
};
pub use repository::{PgUserRepository, UserRepository};
pub use service::UserService;
