//! Mock PostgreSQL connections for service and route tests.

use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, Value};

/// Banner used by the helpers below.
pub const SAMPLE_BANNER: &str =
    "PostgreSQL 16.3 on x86_64-pc-linux-gnu, compiled by gcc (GCC) 12.2.0, 64-bit";

/// Empty Postgres mock; queue results on it yourself.
pub fn postgres() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// Single-row result with a `version` column.
pub fn version_row(banner: &str) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("version", Value::from(banner.to_string()))])
}

/// Connection that answers `times` version queries with `banner`.
pub fn version_db(banner: &str, times: usize) -> DatabaseConnection {
    let results: Vec<Vec<BTreeMap<&'static str, Value>>> =
        (0..times).map(|_| vec![version_row(banner)]).collect();
    postgres().append_query_results(results).into_connection()
}

/// Connection whose first query fails with `err`.
pub fn failing_db(err: DbErr) -> DatabaseConnection {
    postgres().append_query_errors([err]).into_connection()
}

/// Single-row result for the health probe.
pub fn health_row() -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("health_check", Value::from(1i32))])
}
