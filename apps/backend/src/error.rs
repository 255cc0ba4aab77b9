use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::trace_ctx;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration, including TLS files. Fatal at startup.
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    /// Pool exhausted, pool closed, or the network refused us.
    #[error("Database unavailable: {detail}")]
    Connection {
        detail: String,
        #[source]
        source: Option<DbErr>,
    },
    /// Failure while running a statement. Carries the driver error untouched.
    #[error("Query failed: {source}")]
    Query {
        #[source]
        source: DbErr,
    },
}

impl AppError {
    /// Helper method to extract error code from any error variant
    fn code(&self) -> &'static str {
        match self {
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::Connection { .. } => "DB_UNAVAILABLE",
            AppError::Query { .. } => "DB_ERROR",
        }
    }

    /// Client-facing detail. Driver messages can echo connection parameters,
    /// so 5xx bodies carry a generic sentence and the full error goes to the log.
    fn detail(&self) -> String {
        match self {
            AppError::Config { .. } => "Service is misconfigured".to_string(),
            AppError::Connection { .. } => "Database connection unavailable".to_string(),
            AppError::Query { .. } => "Database query failed".to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Connection { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Query { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn connection(detail: impl Into<String>) -> Self {
        Self::Connection {
            detail: detail.into(),
            source: None,
        }
    }

    pub fn query(source: DbErr) -> Self {
        Self::Query { source }
    }

    /// The driver error behind a `Connection` or `Query` failure, if any.
    pub fn db_err(&self) -> Option<&DbErr> {
        match self {
            AppError::Connection { source, .. } => source.as_ref(),
            AppError::Query { source } => Some(source),
            AppError::Config { .. } => None,
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DbErr> for AppError {
    fn from(e: DbErr) -> Self {
        match e {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => AppError::Connection {
                detail: e.to_string(),
                source: Some(e),
            },
            other => AppError::Query { source: other },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();
        let trace_id = trace_ctx::trace_id();

        tracing::error!(error = %self, code, trace_id = %trace_id, "request failed");

        let problem_details = ProblemDetails {
            type_: format!("https://pgprobe.dev/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}
