use actix_web::{web, HttpResponse};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    app_version: String,
    db: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
    time: String,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let app_version = env!("CARGO_PKG_VERSION").to_string();

    let time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    // The probe reports database trouble in the body; the process itself is up.
    let (db, db_error) = if app_state.db.is_closed() {
        ("error".to_string(), Some("pool closed".to_string()))
    } else {
        let conn = app_state.db.connection();
        match conn
            .query_one(Statement::from_string(
                conn.get_database_backend(),
                "SELECT 1 AS health_check".to_string(),
            ))
            .await
        {
            Ok(_) => ("ok".to_string(), None),
            Err(e) => {
                tracing::warn!(error = %e, "health probe query failed");
                ("error".to_string(), Some("query failed".to_string()))
            }
        }
    };

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        app_version,
        db,
        db_error,
        time,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
