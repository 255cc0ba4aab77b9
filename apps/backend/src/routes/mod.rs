use actix_web::web;

pub mod health;
pub mod postgres;

/// Register every route. Used by `main.rs` and by the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Server metadata: /postgres_version
    cfg.configure(postgres::configure_routes);
}
