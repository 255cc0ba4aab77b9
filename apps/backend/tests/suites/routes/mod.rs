pub mod error_shape;
pub mod health;
pub mod postgres_version;
