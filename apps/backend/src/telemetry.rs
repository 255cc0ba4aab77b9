//! Tracing subscribers for the server and for test binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const BASE_FILTER: &str = "info,actix_web=info,sqlx=warn,sea_orm=warn";
/// sqlx logs each executed statement at debug under this target.
const ECHO_DIRECTIVE: &str = "sqlx::query=debug";

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(echo: bool) -> String {
    if echo {
        format!("{BASE_FILTER},{ECHO_DIRECTIVE}")
    } else {
        BASE_FILTER.to_string()
    }
}

/// JSON logs on stdout. `RUST_LOG` replaces the default filter entirely.
pub fn init_tracing(echo: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(echo)));

    let fmt_layer = fmt::layer()
        .with_target(echo)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Plain-text subscriber routed through the libtest writer.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, then `warn`. Safe to call from
/// every test binary and more than once; only the first call installs anything.
pub fn init_test_tracing() {
    let filter = std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .try_init();
}
