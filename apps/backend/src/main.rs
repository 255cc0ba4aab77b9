use actix_web::{web, App, HttpServer};
use pgprobe::config::Config;
use pgprobe::infra::state::build_state;
use pgprobe::middleware::RequestTrace;
use pgprobe::{routes, telemetry};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load first so DB_ECHO can shape the log filter; a rejection is still logged.
    let loaded = Config::load();
    telemetry::init_tracing(matches!(&loaded, Ok(config) if config.pool.echo));

    // Everything is validated here; a bad value stops the process before it binds.
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration rejected");
            std::process::exit(1);
        }
    };

    let app_state = match build_state(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    info!(
        host = %config.host,
        port = config.port,
        source = config.source.as_str(),
        "starting pgprobe"
    );

    let data = web::Data::new(app_state.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    // Resolves after a graceful stop (SIGINT/SIGTERM); the pool goes with it.
    let result = server.await;

    if let Err(e) = app_state.shutdown().await {
        error!(error = %e, "failed to close database pool");
    }
    info!("shutdown complete");

    result
}
