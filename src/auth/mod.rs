//! Bearer-token authentication.
//!
//! - [`password`]: argon2 hashing
//! - [`token`]: HS256 JWT issue/verify
//! - [`middleware`]: axum layer that injects [`AuthenticatedUser`]

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::jwt_auth_middleware;
pub use token::{AuthenticatedUser, Claims, TokenService};
