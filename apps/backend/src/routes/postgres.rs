use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    pub info: String,
}

async fn postgres_version(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let info = app_state.server_info.fetch_server_version(None).await?;
    Ok(HttpResponse::Ok().json(VersionResponse { info }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/postgres_version", web::get().to(postgres_version));
}
