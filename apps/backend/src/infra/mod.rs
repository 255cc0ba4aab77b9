//! Infrastructure layer - connection pool and state assembly.

pub mod db;
pub mod state;
