//! Shared test utilities for the pgprobe backend.
//!
//! Mock databases, certificate fixtures, environment guards and
//! problem-details assertions.

pub mod certs;
pub mod env;
pub mod mock_db;
pub mod problem_details;
