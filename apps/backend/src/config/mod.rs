pub mod app;
pub mod db;
pub mod env;

pub use app::Config;
