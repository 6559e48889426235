pub mod health;

pub use health::{HealthResponse, __path_health_check, health_check};
